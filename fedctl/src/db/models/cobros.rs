//! Database request/response models for cobros.

use crate::api::models::cobros::EstadoCobro;
use crate::types::{ClubId, CobroId, EquipoId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CobroCreateDBRequest {
    pub concepto: String,
    pub monto: Decimal,
    pub fecha: NaiveDate,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub club_id: ClubId,
    pub equipo_id: Option<EquipoId>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CobroUpdateDBRequest {
    pub concepto: Option<String>,
    pub monto: Option<Decimal>,
    pub fecha: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub equipo_id: Option<EquipoId>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CobroDBResponse {
    pub id: CobroId,
    pub concepto: String,
    pub monto: Decimal,
    pub fecha: NaiveDate,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub estado: EstadoCobro,
    pub club_id: ClubId,
    pub equipo_id: Option<EquipoId>,
    pub comprobante: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
