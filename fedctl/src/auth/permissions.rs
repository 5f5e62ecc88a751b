//! Permission checking and the `RequiresPermission` extractor.
//!
//! Handlers declare what they need in their signature:
//!
//! ```ignore
//! async fn create_club(
//!     State(state): State<AppState>,
//!     current_user: RequiresPermission<resource::Clubs, operation::CreateAll>,
//!     Json(create): Json<ClubCreate>,
//! ) -> Result<...> { ... }
//! ```
//!
//! The extractor authenticates the request and then checks the user's role
//! against the role/permission matrix in [`role_allows`]. It derefs to
//! [`CurrentUser`] so handlers can read `current_user.id` directly.

use std::marker::PhantomData;
use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    api::models::usuarios::{CurrentUser, Rol},
    errors::{Error, Result},
    types::{Operation, Permission, Resource},
    AppState,
};

/// Marker trait mapping a zero-sized type to a [`Resource`].
pub trait ResourceMarker: Send + Sync {
    const RESOURCE: Resource;
}

/// Marker trait mapping a zero-sized type to an [`Operation`].
pub trait OperationMarker: Send + Sync {
    const OPERATION: Operation;
}

/// Zero-sized resource markers for use in handler signatures.
pub mod resource {
    use super::ResourceMarker;
    use crate::types::Resource;

    macro_rules! resource_marker {
        ($name:ident) => {
            pub struct $name;
            impl ResourceMarker for $name {
                const RESOURCE: Resource = Resource::$name;
            }
        };
    }

    resource_marker!(Usuarios);
    resource_marker!(Clubs);
    resource_marker!(Personas);
    resource_marker!(Categorias);
    resource_marker!(Equipos);
    resource_marker!(Cobros);
    resource_marker!(Pagos);
    resource_marker!(Credenciales);
    resource_marker!(Galerias);
}

/// Zero-sized operation markers for use in handler signatures.
pub mod operation {
    use super::OperationMarker;
    use crate::types::Operation;

    macro_rules! operation_marker {
        ($name:ident) => {
            pub struct $name;
            impl OperationMarker for $name {
                const OPERATION: Operation = Operation::$name;
            }
        };
    }

    operation_marker!(CreateAll);
    operation_marker!(ReadAll);
    operation_marker!(UpdateAll);
    operation_marker!(DeleteAll);
}

/// Role/permission matrix.
///
/// Administrators can do everything. Regular users get read access to the
/// federation data but cannot mutate anything or see user accounts.
pub fn role_allows(rol: Rol, resource: Resource, operation: Operation) -> bool {
    match rol {
        Rol::Administrador => true,
        Rol::Usuario => match operation {
            Operation::ReadAll => resource != Resource::Usuarios,
            _ => false,
        },
    }
}

/// An authenticated user that has been checked against a required permission.
pub struct RequiresPermission<R, O> {
    user: CurrentUser,
    _marker: PhantomData<(R, O)>,
}

impl<R, O> Deref for RequiresPermission<R, O> {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<R, O> RequiresPermission<R, O> {
    pub fn into_inner(self) -> CurrentUser {
        self.user
    }
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: ResourceMarker,
    O: OperationMarker,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if role_allows(user.rol, R::RESOURCE, O::OPERATION) {
            Ok(Self {
                user,
                _marker: PhantomData,
            })
        } else {
            Err(Error::InsufficientPermissions {
                required: Permission::Allow(R::RESOURCE, O::OPERATION),
                action: O::OPERATION,
                resource: format!("{:?}", R::RESOURCE),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything() {
        for resource in [Resource::Usuarios, Resource::Clubs, Resource::Pagos] {
            for operation in [
                Operation::CreateAll,
                Operation::ReadAll,
                Operation::UpdateAll,
                Operation::DeleteAll,
            ] {
                assert!(role_allows(Rol::Administrador, resource, operation));
            }
        }
    }

    #[test]
    fn regular_user_is_read_only() {
        assert!(role_allows(Rol::Usuario, Resource::Clubs, Operation::ReadAll));
        assert!(role_allows(Rol::Usuario, Resource::Personas, Operation::ReadAll));

        assert!(!role_allows(Rol::Usuario, Resource::Clubs, Operation::CreateAll));
        assert!(!role_allows(Rol::Usuario, Resource::Personas, Operation::UpdateAll));
        assert!(!role_allows(Rol::Usuario, Resource::Cobros, Operation::DeleteAll));
    }

    #[test]
    fn regular_user_cannot_see_accounts() {
        assert!(!role_allows(Rol::Usuario, Resource::Usuarios, Operation::ReadAll));
    }
}
