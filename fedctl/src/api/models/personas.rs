//! API request/response models for personas (federation members).

use super::pagination::Pagination;
use crate::api::models::credenciales::CredencialResponse;
use crate::db::models::personas::PersonaDBResponse;
use crate::types::{ClubId, PersonaId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// License status for a federation member.
///
/// ACTIVO/VENCIDO are derived from the license window; SUSPENDIDO and
/// INACTIVO are administrative states that the expiry sweep never touches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "estado_licencia", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EstadoLicencia {
    Activo,
    Inactivo,
    Suspendido,
    Vencido,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonaCreate {
    pub nombre_apellido: String,
    pub dni: String,
    pub fecha_nacimiento: NaiveDate,
    pub club_id: Option<ClubId>,
    pub licencia_numero: Option<String>,
    /// License start date; defaults to today when omitted. The expiry date
    /// and status are derived, never accepted from the client.
    pub fecha_licencia: Option<NaiveDate>,
    pub tipo: Option<String>,
    pub categoria: Option<String>,
    pub categoria_nivel: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonaUpdate {
    pub nombre_apellido: Option<String>,
    pub dni: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub club_id: Option<ClubId>,
    pub licencia_numero: Option<String>,
    /// Providing a new start date re-derives the window and synchronizes the
    /// credential in the same transaction.
    pub fecha_licencia: Option<NaiveDate>,
    pub tipo: Option<String>,
    pub categoria: Option<String>,
    pub categoria_nivel: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonaResponse {
    pub id: PersonaId,
    pub nombre_apellido: String,
    pub dni: String,
    pub fecha_nacimiento: NaiveDate,
    pub club_id: Option<ClubId>,
    pub licencia_numero: Option<String>,
    pub fecha_licencia: Option<NaiveDate>,
    pub fecha_licencia_baja: Option<NaiveDate>,
    pub estado_licencia: Option<EstadoLicencia>,
    pub tipo: Option<String>,
    pub categoria: Option<String>,
    pub categoria_nivel: Option<i32>,
    pub foto_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Credentials for this persona (only included if requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credenciales: Option<Vec<CredencialResponse>>,
}

impl From<PersonaDBResponse> for PersonaResponse {
    fn from(db: PersonaDBResponse) -> Self {
        Self {
            id: db.id,
            nombre_apellido: db.nombre_apellido,
            dni: db.dni,
            fecha_nacimiento: db.fecha_nacimiento,
            club_id: db.club_id,
            licencia_numero: db.licencia_numero,
            fecha_licencia: db.fecha_licencia,
            fecha_licencia_baja: db.fecha_licencia_baja,
            estado_licencia: db.estado_licencia,
            tipo: db.tipo,
            categoria: db.categoria,
            categoria_nivel: db.categoria_nivel,
            foto_url: db.foto_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
            credenciales: None,
        }
    }
}

impl PersonaResponse {
    pub fn with_credenciales(mut self, credenciales: Vec<CredencialResponse>) -> Self {
        self.credenciales = Some(credenciales);
        self
    }
}

/// Query parameters for listing personas
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPersonasQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Include related data (comma-separated: "credenciales")
    pub include: Option<String>,
}

/// Query parameters for the persona filter endpoint.
///
/// Substring filters are case-insensitive; date filters are inclusive ranges.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PersonaFilterQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub nombre_apellido: Option<String>,
    pub dni: Option<String>,
    pub tipo: Option<String>,
    pub categoria: Option<String>,
    pub club_id: Option<ClubId>,
    pub estado_licencia: Option<EstadoLicencia>,
    pub fecha_nacimiento_desde: Option<NaiveDate>,
    pub fecha_nacimiento_hasta: Option<NaiveDate>,
    pub fecha_licencia_desde: Option<NaiveDate>,
    pub fecha_licencia_hasta: Option<NaiveDate>,
    pub fecha_licencia_baja_desde: Option<NaiveDate>,
    pub fecha_licencia_baja_hasta: Option<NaiveDate>,
}

/// Result of the bulk license-expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepResponse {
    /// Number of personas whose estado_licencia changed
    pub personas_actualizadas: u64,
    /// Number of credenciales cascaded to the new estado
    pub credenciales_actualizadas: u64,
}

/// Aggregated counts for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResumenResponse {
    pub total: i64,
    pub activas: i64,
    pub vencidas: i64,
    pub por_tipo: Vec<ConteoPorClave>,
    pub por_club: Vec<ConteoPorClave>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConteoPorClave {
    pub clave: String,
    pub cantidad: i64,
}

/// Response for the persona photo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FotoResponse {
    pub persona_id: PersonaId,
    pub nombre_apellido: String,
    pub foto_url: String,
}
