//! Database request/response models for pagos.

use crate::api::models::pagos::EstadoPago;
use crate::types::{CobroId, PagoId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct PagoCreateDBRequest {
    pub cobro_id: CobroId,
    pub payment_id: String,
    pub monto: Decimal,
    pub estado: EstadoPago,
    pub metodo_pago: String,
    pub preference_id: Option<String>,
    pub datos_extra: Option<serde_json::Value>,
    /// Receipt stamped on the cobro when this pago is terminal-success
    pub comprobante: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PagoUpdateDBRequest {
    pub estado: Option<EstadoPago>,
    pub datos_extra: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PagoDBResponse {
    pub id: PagoId,
    pub cobro_id: CobroId,
    pub payment_id: String,
    pub monto: Decimal,
    pub estado: EstadoPago,
    pub metodo_pago: String,
    pub preference_id: Option<String>,
    pub datos_extra: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
