//! API request/response models for pagos.

use super::pagination::Pagination;
use crate::db::models::pagos::PagoDBResponse;
use crate::types::{CobroId, PagoId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// State of an individual payment, mirroring the provider's terminal states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "estado_pago")]
pub enum EstadoPago {
    Pendiente,
    Pagado,
    Rechazado,
    Devuelto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PagoCreate {
    pub cobro_id: CobroId,
    /// Provider transaction id (or an internal receipt number for manual payments)
    pub payment_id: String,
    #[schema(value_type = Option<f64>)]
    /// Amount paid; defaults to the cobro's monto when omitted
    pub monto: Option<Decimal>,
    pub estado: EstadoPago,
    /// Payment method label (e.g. "MercadoPago", "Transferencia", "Efectivo")
    pub metodo_pago: String,
    /// Receipt stamped on the cobro when estado is Pagado; synthesized when omitted
    pub comprobante: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PagoResponse {
    pub id: PagoId,
    pub cobro_id: CobroId,
    pub payment_id: String,
    #[schema(value_type = f64)]
    pub monto: Decimal,
    pub estado: EstadoPago,
    pub metodo_pago: String,
    pub preference_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PagoDBResponse> for PagoResponse {
    fn from(db: PagoDBResponse) -> Self {
        Self {
            id: db.id,
            cobro_id: db.cobro_id,
            payment_id: db.payment_id,
            monto: db.monto,
            estado: db.estado,
            metodo_pago: db.metodo_pago,
            preference_id: db.preference_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing pagos
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPagosQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub cobro_id: Option<CobroId>,
    pub estado: Option<EstadoPago>,
}
