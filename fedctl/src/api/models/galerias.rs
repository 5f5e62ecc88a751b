//! API request/response models for galerias and imagenes.

use super::pagination::Pagination;
use crate::db::models::galerias::{GaleriaDBResponse, ImagenDBResponse};
use crate::types::{GaleriaId, ImagenId, UsuarioId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GaleriaCreate {
    pub nombre: String,
    pub descripcion: Option<String>,
    /// Defaults to published
    pub publicada: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GaleriaUpdate {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub portada_url: Option<String>,
    pub publicada: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GaleriaResponse {
    pub id: GaleriaId,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub portada_url: Option<String>,
    pub publicada: bool,
    pub autor_id: Option<UsuarioId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Images in display order (only included on single-gallery reads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagenes: Option<Vec<ImagenResponse>>,
}

impl From<GaleriaDBResponse> for GaleriaResponse {
    fn from(db: GaleriaDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            descripcion: db.descripcion,
            portada_url: db.portada_url,
            publicada: db.publicada,
            autor_id: db.autor_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
            imagenes: None,
        }
    }
}

impl GaleriaResponse {
    pub fn with_imagenes(mut self, imagenes: Vec<ImagenResponse>) -> Self {
        self.imagenes = Some(imagenes);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImagenResponse {
    pub id: ImagenId,
    pub galeria_id: GaleriaId,
    pub titulo: Option<String>,
    pub url: String,
    pub thumb_url: Option<String>,
    pub orden: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ImagenDBResponse> for ImagenResponse {
    fn from(db: ImagenDBResponse) -> Self {
        Self {
            id: db.id,
            galeria_id: db.galeria_id,
            titulo: db.titulo,
            url: db.url,
            thumb_url: db.thumb_url,
            orden: db.orden,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing galerias
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListGaleriasQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by publication state (staff only; public listings are always published-only)
    pub publicada: Option<bool>,
}
