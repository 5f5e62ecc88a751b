//! API request/response models for categorias.

use super::pagination::Pagination;
use crate::db::models::categorias::CategoriaDBResponse;
use crate::types::CategoriaId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoriaCreate {
    pub nombre: String,
    pub tipo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoriaUpdate {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoriaResponse {
    pub id: CategoriaId,
    pub nombre: String,
    pub tipo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoriaDBResponse> for CategoriaResponse {
    fn from(db: CategoriaDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            tipo: db.tipo,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing categorias
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListCategoriasQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by tipo (case-insensitive substring match)
    pub tipo: Option<String>,
}
