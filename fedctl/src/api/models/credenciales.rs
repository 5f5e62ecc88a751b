//! API response models for credenciales (read-only surface).

use super::pagination::Pagination;
use crate::api::models::personas::EstadoLicencia;
use crate::db::models::credenciales::CredencialDBResponse;
use crate::types::{CredencialId, PersonaId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredencialResponse {
    pub id: CredencialId,
    pub persona_id: PersonaId,
    pub identificador: String,
    pub fecha_alta: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub estado: EstadoLicencia,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CredencialDBResponse> for CredencialResponse {
    fn from(db: CredencialDBResponse) -> Self {
        Self {
            id: db.id,
            persona_id: db.persona_id,
            identificador: db.identificador,
            fecha_alta: db.fecha_alta,
            fecha_vencimiento: db.fecha_vencimiento,
            estado: db.estado,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing credenciales
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListCredencialesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub persona_id: Option<PersonaId>,
    pub estado: Option<EstadoLicencia>,
}
