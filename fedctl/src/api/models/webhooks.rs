//! API models for the inbound payment webhook.
//!
//! MercadoPago delivers notifications in two shapes: a JSON body
//! (`{"type": "payment", "data": {"id": "..."}}`, IPN style) and a bare
//! query string (`?id=...&topic=payment`). Both normalize into a
//! [`crate::webhooks::reconciliation::WebhookDelivery`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::webhooks::reconciliation::WebhookDelivery;

/// JSON body of an IPN-style delivery.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookBody {
    /// Notification type ("payment", "merchant_order", ...)
    #[serde(rename = "type", alias = "topic")]
    pub kind: Option<String>,
    pub data: Option<WebhookData>,
    pub user_id: Option<i64>,
    pub api_version: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    /// Resource path some delivery formats include
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookData {
    pub id: serde_json::Value,
}

/// Query parameters of a simple-format delivery (also sent on GET).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct WebhookQuery {
    pub id: Option<String>,
    pub topic: Option<String>,
    /// Alias used by some delivery revisions
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Acknowledgement body. The webhook caller always receives 200 with one of
/// these once the delivery is authenticated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAck {
    pub message: String,
}

impl WebhookBody {
    /// Normalize a JSON body into a delivery, if it carries enough to identify
    /// the resource.
    pub fn into_delivery(self, raw: serde_json::Value) -> Option<WebhookDelivery> {
        let topic = self.kind?;
        // data.id arrives as either a JSON string or a number
        let resource_id = match &self.data?.id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };

        Some(WebhookDelivery {
            resource_id,
            topic,
            user_id: self.user_id,
            api_version: self.api_version,
            sent_at: self.date_created,
            raw_payload: Some(raw),
        })
    }
}

impl WebhookQuery {
    /// Normalize query parameters into a delivery.
    pub fn into_delivery(self) -> Option<WebhookDelivery> {
        let resource_id = self.id?;
        let topic = self.topic.or(self.kind)?;

        Some(WebhookDelivery {
            resource_id,
            topic,
            user_id: None,
            api_version: None,
            sent_at: None,
            raw_payload: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_with_string_id_normalizes() {
        let raw = serde_json::json!({
            "type": "payment",
            "data": { "id": "12345" },
            "user_id": 99,
            "api_version": "v1"
        });
        let body: WebhookBody = serde_json::from_value(raw.clone()).unwrap();
        let delivery = body.into_delivery(raw).unwrap();

        assert_eq!(delivery.resource_id, "12345");
        assert_eq!(delivery.topic, "payment");
        assert_eq!(delivery.user_id, Some(99));
    }

    #[test]
    fn body_with_numeric_id_normalizes() {
        let raw = serde_json::json!({ "type": "payment", "data": { "id": 6789 } });
        let body: WebhookBody = serde_json::from_value(raw.clone()).unwrap();
        let delivery = body.into_delivery(raw).unwrap();
        assert_eq!(delivery.resource_id, "6789");
    }

    #[test]
    fn body_without_data_is_rejected() {
        let raw = serde_json::json!({ "type": "payment" });
        let body: WebhookBody = serde_json::from_value(raw.clone()).unwrap();
        assert!(body.into_delivery(raw).is_none());
    }

    #[test]
    fn query_format_normalizes() {
        let query = WebhookQuery {
            id: Some("555".to_string()),
            topic: Some("payment".to_string()),
            kind: None,
        };
        let delivery = query.into_delivery().unwrap();
        assert_eq!(delivery.resource_id, "555");
        assert_eq!(delivery.topic, "payment");

        let incomplete = WebhookQuery::default();
        assert!(incomplete.into_delivery().is_none());
    }
}
