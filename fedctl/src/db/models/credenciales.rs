//! Database request/response models for credenciales.

use crate::api::models::personas::EstadoLicencia;
use crate::types::{CredencialId, PersonaId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CredencialCreateDBRequest {
    pub persona_id: PersonaId,
    pub identificador: String,
    pub fecha_alta: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub estado: EstadoLicencia,
}

/// Credential updates always come from a license change, so the three
/// window fields travel together.
#[derive(Debug, Clone)]
pub struct CredencialUpdateDBRequest {
    pub fecha_alta: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub estado: EstadoLicencia,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CredencialDBResponse {
    pub id: CredencialId,
    pub persona_id: PersonaId,
    pub identificador: String,
    pub fecha_alta: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub estado: EstadoLicencia,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
