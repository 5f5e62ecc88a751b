//! API request/response models for usuarios and authentication.

use super::pagination::Pagination;
use crate::db::models::usuarios::UsuarioDBResponse;
use crate::types::UsuarioId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Staff role. Administrators can mutate everything; regular users are
/// read-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Rol {
    Administrador,
    Usuario,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsuarioCreate {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password: String,
    pub rol: Rol,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsuarioUpdate {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub password: Option<String>,
    pub rol: Option<Rol>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsuarioResponse {
    pub id: UsuarioId,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub rol: Rol,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UsuarioDBResponse> for UsuarioResponse {
    fn from(db: UsuarioDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            apellido: db.apellido,
            email: db.email,
            rol: db.rol,
            last_login: db.last_login,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing usuarios
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsuariosQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by email (case-insensitive substring match)
    pub email: Option<String>,
}

/// The authenticated principal attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UsuarioId,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub rol: Rol,
}

impl From<UsuarioDBResponse> for CurrentUser {
    fn from(db: UsuarioDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            apellido: db.apellido,
            email: db.email,
            rol: db.rol,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: CurrentUser,
}
