//! Database request/response models for personas.

use crate::api::models::personas::EstadoLicencia;
use crate::types::{ClubId, PersonaId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct PersonaCreateDBRequest {
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
}

#[derive(Debug, Clone, Default)]
pub struct PersonaUpdateDBRequest {
    pub nombre_apellido: Option<String>,
    pub dni: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub club_id: Option<ClubId>,
    pub licencia_numero: Option<String>,
    pub fecha_licencia: Option<NaiveDate>,
    pub fecha_licencia_baja: Option<NaiveDate>,
    pub estado_licencia: Option<EstadoLicencia>,
    pub tipo: Option<String>,
    pub categoria: Option<String>,
    pub categoria_nivel: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersonaDBResponse {
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
    pub foto_delete_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
