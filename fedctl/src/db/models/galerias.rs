//! Database request/response models for galerias and their imagenes.

use crate::types::{GaleriaId, ImagenId, UsuarioId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct GaleriaCreateDBRequest {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub publicada: bool,
    pub autor_id: Option<UsuarioId>,
}

#[derive(Debug, Clone, Default)]
pub struct GaleriaUpdateDBRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub portada_url: Option<String>,
    pub publicada: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GaleriaDBResponse {
    pub id: GaleriaId,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub portada_url: Option<String>,
    pub publicada: bool,
    pub autor_id: Option<UsuarioId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ImagenCreateDBRequest {
    pub galeria_id: GaleriaId,
    pub titulo: Option<String>,
    pub url: String,
    pub thumb_url: Option<String>,
    pub delete_url: Option<String>,
    pub orden: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImagenDBResponse {
    pub id: ImagenId,
    pub galeria_id: GaleriaId,
    pub titulo: Option<String>,
    pub url: String,
    pub thumb_url: Option<String>,
    pub delete_url: Option<String>,
    pub orden: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
