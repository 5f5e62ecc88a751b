//! Common type definitions and permission system types.
//!
//! All entity IDs are `i32` values backed by `SERIAL` columns, wrapped in
//! type aliases so signatures say what they take. The permission system is
//! built from three types:
//!
//! - [`Resource`]: what entity type is being accessed
//! - [`Operation`]: what action is being performed
//! - [`Permission`]: an authorization requirement combining the two

use std::fmt;

// Type aliases for IDs
pub type UsuarioId = i32;
pub type ClubId = i32;
pub type PersonaId = i32;
pub type CategoriaId = i32;
pub type EquipoId = i32;
pub type CobroId = i32;
pub type PagoId = i32;
pub type CredencialId = i32;
pub type GaleriaId = i32;
pub type ImagenId = i32;
pub type NotificationId = i32;

// Operations that can be performed on resources.
// *All means unrestricted access, *Own means restricted to own resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    ReadAll,
    UpdateAll,
    UpdateOwn,
    DeleteAll,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Usuarios,
    Clubs,
    Personas,
    Categorias,
    Equipos,
    Cobros,
    Pagos,
    Credenciales,
    Galerias,
}

// Permission types for authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Simple permission: (Resource, Operation)
    Allow(Resource, Operation),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll => write!(f, "Create"),
            Operation::ReadAll => write!(f, "Read"),
            Operation::UpdateAll | Operation::UpdateOwn => write!(f, "Update"),
            Operation::DeleteAll => write!(f, "Delete"),
        }
    }
}
