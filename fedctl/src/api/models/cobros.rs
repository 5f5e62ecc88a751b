//! API request/response models for cobros.

use super::pagination::Pagination;
use crate::db::models::cobros::CobroDBResponse;
use crate::types::{ClubId, CobroId, EquipoId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Lifecycle state of a charge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "estado_cobro")]
pub enum EstadoCobro {
    Pendiente,
    Pagado,
    Vencido,
    Anulado,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CobroCreate {
    pub concepto: String,
    #[schema(value_type = f64)]
    pub monto: Decimal,
    /// Charge date; defaults to today when omitted
    pub fecha: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub club_id: ClubId,
    pub equipo_id: Option<EquipoId>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CobroUpdate {
    pub concepto: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub monto: Option<Decimal>,
    pub fecha: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub equipo_id: Option<EquipoId>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CobroResponse {
    pub id: CobroId,
    pub concepto: String,
    #[schema(value_type = f64)]
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

impl From<CobroDBResponse> for CobroResponse {
    fn from(db: CobroDBResponse) -> Self {
        Self {
            id: db.id,
            concepto: db.concepto,
            monto: db.monto,
            fecha: db.fecha,
            fecha_vencimiento: db.fecha_vencimiento,
            estado: db.estado,
            club_id: db.club_id,
            equipo_id: db.equipo_id,
            comprobante: db.comprobante,
            observaciones: db.observaciones,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing cobros
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListCobrosQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub club_id: Option<ClubId>,
    pub estado: Option<EstadoCobro>,
}

/// A checkout preference created for a cobro.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreferenciaResponse {
    pub cobro_id: CobroId,
    pub preference_id: String,
    /// URL the payer should be redirected to
    pub init_point: String,
    pub external_reference: String,
}
