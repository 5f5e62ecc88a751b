//! Database request/response models for usuarios.

use crate::api::models::usuarios::Rol;
use crate::types::UsuarioId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct UsuarioCreateDBRequest {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub rol: Rol,
}

#[derive(Debug, Clone, Default)]
pub struct UsuarioUpdateDBRequest {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub password_hash: Option<String>,
    pub rol: Option<Rol>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsuarioDBResponse {
    pub id: UsuarioId,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub rol: Rol,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
