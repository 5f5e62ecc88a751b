//! MercadoPago payment provider.
//!
//! Thin REST client over the two endpoints the backend needs:
//! `POST /checkout/preferences` and `GET /v1/payments/{id}`. All calls run
//! with a bounded timeout so a slow provider cannot stall request handling.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use super::{PaymentError, PaymentProvider, PreferenceRequest, PreferenceResponse, ProviderPayment, Result};
use crate::config::MercadoPagoConfig;

pub struct MercadoPagoProvider {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
    notification_url: Option<Url>,
}

#[derive(Debug, Deserialize)]
struct PreferenceApiResponse {
    id: String,
    init_point: String,
}

impl MercadoPagoProvider {
    pub fn new(config: MercadoPagoConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction cannot fail with these options");

        Self {
            client,
            base_url: config.base_url,
            access_token: config.access_token,
            notification_url: config.notification_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PaymentError::InvalidData(format!("invalid provider URL: {e}")))
    }
}

#[async_trait]
impl PaymentProvider for MercadoPagoProvider {
    #[instrument(skip(self, request), fields(external_reference = %request.external_reference), err)]
    async fn create_preference(&self, request: &PreferenceRequest) -> Result<PreferenceResponse> {
        let mut body = json!({
            "items": [{
                "title": request.titulo,
                "quantity": 1,
                "currency_id": "ARS",
                "unit_price": request.monto,
            }],
            "external_reference": request.external_reference,
        });
        if let Some(notification_url) = &self.notification_url {
            body["notification_url"] = json!(notification_url.as_str());
        }

        let response = self
            .client
            .post(self.endpoint("/checkout/preferences")?)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::ProviderApi(format!("create preference request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::ProviderApi(format!(
                "create preference returned {status}: {body}"
            )));
        }

        let preference: PreferenceApiResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidData(format!("malformed preference response: {e}")))?;

        Ok(PreferenceResponse {
            preference_id: preference.id,
            init_point: preference.init_point,
        })
    }

    #[instrument(skip(self), err)]
    async fn get_payment(&self, payment_id: &str) -> Result<ProviderPayment> {
        let response = self
            .client
            .get(self.endpoint(&format!("/v1/payments/{payment_id}"))?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| PaymentError::ProviderApi(format!("get payment request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::NotFound(payment_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::ProviderApi(format!("get payment returned {status}: {body}")));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidData(format!("malformed payment response: {e}")))?;

        let payment_status = raw
            .get("status")
            .and_then(|s| s.as_str())
            .ok_or_else(|| PaymentError::InvalidData("payment response missing status".to_string()))?
            .to_string();

        let transaction_amount = raw
            .get("transaction_amount")
            .and_then(|v| v.as_f64())
            .and_then(Decimal::from_f64_retain);

        let external_reference = raw
            .get("external_reference")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let preference_id = raw.get("preference_id").and_then(|v| v.as_str()).map(|s| s.to_string());

        Ok(ProviderPayment {
            id: payment_id.to_string(),
            status: payment_status,
            transaction_amount,
            external_reference,
            preference_id,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::pagos::EstadoPago;
    use wiremock::matchers::{bearer_token, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> MercadoPagoProvider {
        MercadoPagoProvider::new(
            MercadoPagoConfig {
                access_token: "TEST-token".to_string(),
                webhook_secret: None,
                base_url: Url::parse(&server.uri()).unwrap(),
                notification_url: None,
            },
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn get_payment_parses_provider_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/payments/9001"))
            .and(bearer_token("TEST-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 9001,
                "status": "approved",
                "transaction_amount": 1500.50,
                "external_reference": "cobro_12_1704067200",
                "preference_id": "pref-1"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let payment = provider.get_payment("9001").await.unwrap();

        assert_eq!(payment.status, "approved");
        assert_eq!(payment.estado(), EstadoPago::Pagado);
        assert_eq!(payment.external_reference.as_deref(), Some("cobro_12_1704067200"));
        assert_eq!(payment.preference_id.as_deref(), Some("pref-1"));
        assert!(payment.transaction_amount.is_some());
    }

    #[tokio::test]
    async fn get_payment_maps_404_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/payments/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider.get_payment("missing").await;
        assert!(matches!(result, Err(PaymentError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_preference_returns_init_point() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/checkout/preferences"))
            .and(bearer_token("TEST-token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "pref-42",
                "init_point": "https://checkout.example/pref-42"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let preference = provider
            .create_preference(&PreferenceRequest {
                titulo: "Afiliacion anual".to_string(),
                monto: Decimal::new(150000, 2),
                external_reference: "cobro_42_1704067200".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(preference.preference_id, "pref-42");
        assert_eq!(preference.init_point, "https://checkout.example/pref-42");
    }

    #[tokio::test]
    async fn provider_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/payments/500"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream broken"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let result = provider.get_payment("500").await;
        assert!(matches!(result, Err(PaymentError::ProviderApi(_))));
    }
}
