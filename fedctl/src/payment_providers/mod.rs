//! Payment provider abstraction layer.
//!
//! This module defines the `PaymentProvider` trait which abstracts the
//! payment gateway: creating checkout preferences for cobros and fetching
//! the authoritative state of a payment during webhook reconciliation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use crate::api::models::pagos::EstadoPago;
use crate::config::PaymentConfig;

pub mod dummy;
pub mod mercadopago;

/// Create a payment provider from configuration.
///
/// This is the single point where config becomes a provider instance.
/// Adding a new provider requires adding a match arm here.
pub fn create_provider(config: PaymentConfig, timeout: Duration) -> Arc<dyn PaymentProvider> {
    match config {
        PaymentConfig::Mercadopago(mp_config) => Arc::new(mercadopago::MercadoPagoProvider::new(mp_config, timeout)),
        PaymentConfig::Dummy(dummy_config) => Arc::new(dummy::DummyProvider::from(dummy_config)),
    }
}

/// Result type for payment provider operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors that can occur talking to the payment provider
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider API error: {0}")]
    ProviderApi(String),

    #[error("Payment {0} not found at provider")]
    NotFound(String),

    #[error("Invalid payment data: {0}")]
    InvalidData(String),
}

/// A checkout preference request for a cobro.
#[derive(Debug, Clone)]
pub struct PreferenceRequest {
    /// Charge description shown at checkout
    pub titulo: String,
    /// Amount to collect
    pub monto: Decimal,
    /// Reference the provider echoes back in webhook deliveries
    /// (format `cobro_{id}_{timestamp}`)
    pub external_reference: String,
}

/// A created checkout preference.
#[derive(Debug, Clone)]
pub struct PreferenceResponse {
    pub preference_id: String,
    /// URL the payer should be redirected to
    pub init_point: String,
}

/// Authoritative payment state fetched from the provider.
#[derive(Debug, Clone)]
pub struct ProviderPayment {
    pub id: String,
    /// Raw provider status (e.g. "approved", "rejected")
    pub status: String,
    pub transaction_amount: Option<Decimal>,
    pub external_reference: Option<String>,
    pub preference_id: Option<String>,
    /// Full provider payload, persisted for auditing
    pub raw: serde_json::Value,
}

impl ProviderPayment {
    /// Map the provider's status string onto our payment state.
    pub fn estado(&self) -> EstadoPago {
        map_payment_status(&self.status)
    }
}

/// Provider status -> local payment state.
///
/// Unknown statuses map to Pendiente: a status we don't recognize must never
/// settle a cobro.
pub fn map_payment_status(status: &str) -> EstadoPago {
    match status {
        "approved" => EstadoPago::Pagado,
        "pending" | "in_process" | "authorized" => EstadoPago::Pendiente,
        "rejected" | "cancelled" => EstadoPago::Rechazado,
        "refunded" | "charged_back" => EstadoPago::Devuelto,
        _ => EstadoPago::Pendiente,
    }
}

/// Abstract payment provider interface.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout preference for a cobro.
    ///
    /// Returns the preference id and the URL the payer should be sent to.
    async fn create_preference(&self, request: &PreferenceRequest) -> Result<PreferenceResponse>;

    /// Fetch the authoritative state of a payment.
    ///
    /// Called during webhook reconciliation; the webhook payload itself is
    /// never trusted for payment state.
    async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(map_payment_status("approved"), EstadoPago::Pagado);
        assert_eq!(map_payment_status("pending"), EstadoPago::Pendiente);
        assert_eq!(map_payment_status("in_process"), EstadoPago::Pendiente);
        assert_eq!(map_payment_status("authorized"), EstadoPago::Pendiente);
        assert_eq!(map_payment_status("rejected"), EstadoPago::Rechazado);
        assert_eq!(map_payment_status("cancelled"), EstadoPago::Rechazado);
        assert_eq!(map_payment_status("refunded"), EstadoPago::Devuelto);
        assert_eq!(map_payment_status("charged_back"), EstadoPago::Devuelto);
    }

    #[test]
    fn unknown_status_never_settles() {
        assert_eq!(map_payment_status("something_new"), EstadoPago::Pendiente);
        assert_eq!(map_payment_status(""), EstadoPago::Pendiente);
    }
}
