//! API request/response models for clubs.

use super::pagination::Pagination;
use crate::db::models::clubs::ClubDBResponse;
use crate::types::ClubId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Affiliation status of a club with the federation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "estado_afiliacion")]
pub enum EstadoAfiliacion {
    Activo,
    Inactivo,
    Suspendido,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClubCreate {
    pub nombre: String,
    pub direccion: String,
    pub telefono: Option<String>,
    pub email: String,
    pub cuit: String,
    pub fecha_afiliacion: NaiveDate,
    pub estado_afiliacion: Option<EstadoAfiliacion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClubUpdate {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub cuit: Option<String>,
    pub fecha_afiliacion: Option<NaiveDate>,
    pub estado_afiliacion: Option<EstadoAfiliacion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClubResponse {
    pub id: ClubId,
    pub nombre: String,
    pub direccion: String,
    pub telefono: Option<String>,
    pub email: String,
    pub cuit: String,
    pub fecha_afiliacion: NaiveDate,
    pub estado_afiliacion: EstadoAfiliacion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClubDBResponse> for ClubResponse {
    fn from(db: ClubDBResponse) -> Self {
        Self {
            id: db.id,
            nombre: db.nombre,
            direccion: db.direccion,
            telefono: db.telefono,
            email: db.email,
            cuit: db.cuit,
            fecha_afiliacion: db.fecha_afiliacion,
            estado_afiliacion: db.estado_afiliacion,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing clubs
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListClubsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

/// Query parameters for the club filter endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ClubFilterQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub nombre: Option<String>,
    pub email: Option<String>,
    pub estado_afiliacion: Option<EstadoAfiliacion>,
}
