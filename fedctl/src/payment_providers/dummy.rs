//! Dummy payment provider for tests and local development.
//!
//! Payments can be scripted per id with [`DummyProvider::set_payment`];
//! anything unscripted reports the configured default status with no
//! external reference.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{PaymentProvider, PreferenceRequest, PreferenceResponse, ProviderPayment, Result};
use crate::config::DummyPaymentConfig;

pub struct DummyProvider {
    default_status: String,
    payments: Mutex<HashMap<String, ProviderPayment>>,
    preferences: Mutex<Vec<PreferenceRequest>>,
}

impl From<DummyPaymentConfig> for DummyProvider {
    fn from(config: DummyPaymentConfig) -> Self {
        Self {
            default_status: config.reported_status.unwrap_or_else(|| "approved".to_string()),
            payments: Mutex::new(HashMap::new()),
            preferences: Mutex::new(Vec::new()),
        }
    }
}

impl DummyProvider {
    /// Script the payment returned for a given id.
    pub fn set_payment(&self, payment: ProviderPayment) {
        self.payments.lock().unwrap().insert(payment.id.clone(), payment);
    }

    /// Preferences created so far (for assertions).
    pub fn created_preferences(&self) -> Vec<PreferenceRequest> {
        self.preferences.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for DummyProvider {
    async fn create_preference(&self, request: &PreferenceRequest) -> Result<PreferenceResponse> {
        self.preferences.lock().unwrap().push(request.clone());
        Ok(PreferenceResponse {
            preference_id: format!("dummy-pref-{}", request.external_reference),
            init_point: format!("https://dummy.invalid/checkout/{}", request.external_reference),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment> {
        if let Some(payment) = self.payments.lock().unwrap().get(payment_id) {
            return Ok(payment.clone());
        }

        Ok(ProviderPayment {
            id: payment_id.to_string(),
            status: self.default_status.clone(),
            transaction_amount: None,
            external_reference: None,
            preference_id: None,
            raw: serde_json::json!({ "id": payment_id, "status": self.default_status }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::pagos::EstadoPago;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn scripted_payment_wins_over_default() {
        let provider = DummyProvider::from(DummyPaymentConfig {
            reported_status: Some("pending".to_string()),
        });

        provider.set_payment(ProviderPayment {
            id: "paid-1".to_string(),
            status: "approved".to_string(),
            transaction_amount: Some(Decimal::new(10000, 2)),
            external_reference: Some("cobro_5_1".to_string()),
            preference_id: None,
            raw: serde_json::json!({}),
        });

        let scripted = provider.get_payment("paid-1").await.unwrap();
        assert_eq!(scripted.estado(), EstadoPago::Pagado);

        let fallback = provider.get_payment("other").await.unwrap();
        assert_eq!(fallback.estado(), EstadoPago::Pendiente);
    }

    #[tokio::test]
    async fn preferences_are_recorded() {
        let provider = DummyProvider::from(DummyPaymentConfig::default());

        let response = provider
            .create_preference(&PreferenceRequest {
                titulo: "Cuota".to_string(),
                monto: Decimal::new(5000, 2),
                external_reference: "cobro_1_99".to_string(),
            })
            .await
            .unwrap();

        assert!(response.init_point.contains("cobro_1_99"));
        assert_eq!(provider.created_preferences().len(), 1);
    }
}
