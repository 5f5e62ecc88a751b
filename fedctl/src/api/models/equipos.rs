//! API request/response models for equipos.

use super::pagination::Pagination;
use crate::db::models::equipos::EquipoDBResponse;
use crate::types::{CategoriaId, ClubId, EquipoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipoCreate {
    pub nombre: String,
    pub club_id: ClubId,
    pub categoria_id: Option<CategoriaId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipoUpdate {
    pub nombre: Option<String>,
    pub club_id: Option<ClubId>,
    pub categoria_id: Option<CategoriaId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipoResponse {
    pub id: EquipoId,
    pub nombre: String,
    pub club_id: ClubId,
    pub categoria_id: Option<CategoriaId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EquipoDBResponse> for EquipoResponse {
    fn from(db: EquipoDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            club_id: db.club_id,
            categoria_id: db.categoria_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing equipos
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListEquiposQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub club_id: Option<ClubId>,
    pub nombre: Option<String>,
}
