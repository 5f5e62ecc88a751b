//! Database request/response models for clubs.

use crate::api::models::clubs::EstadoAfiliacion;
use crate::types::ClubId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct ClubCreateDBRequest {
    pub nombre: String,
    pub direccion: String,
    pub telefono: Option<String>,
    pub email: String,
    pub cuit: String,
    pub fecha_afiliacion: NaiveDate,
    pub estado_afiliacion: EstadoAfiliacion,
}

#[derive(Debug, Clone, Default)]
pub struct ClubUpdateDBRequest {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub cuit: Option<String>,
    pub fecha_afiliacion: Option<NaiveDate>,
    pub estado_afiliacion: Option<EstadoAfiliacion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClubDBResponse {
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
