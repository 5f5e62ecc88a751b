//! Database request/response models for categorias.

use crate::types::CategoriaId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CategoriaCreateDBRequest {
    pub nombre: String,
    pub tipo: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoriaUpdateDBRequest {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoriaDBResponse {
    pub id: CategoriaId,
    pub nombre: String,
    pub tipo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
