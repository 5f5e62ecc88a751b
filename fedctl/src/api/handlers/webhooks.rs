//! HTTP handlers for inbound payment webhooks.
//!
//! The endpoint is unauthenticated by design (the provider cannot carry our
//! session credentials) and, once a delivery is authenticated, always
//! answers 200 so the provider stops retrying; processing failures are
//! recorded internally. The only non-200 answer is 401 for a missing or
//! invalid signature when a webhook secret is configured.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::api::models::webhooks::{WebhookAck, WebhookBody, WebhookQuery};
use crate::config::PaymentConfig;
use crate::errors::Result;
use crate::webhooks::reconciliation::{self, ReconcileOutcome, WebhookDelivery};
use crate::webhooks::signing;
use crate::AppState;

fn ack(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(WebhookAck {
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Enforce the signature policy: when a webhook secret is configured, every
/// delivery must carry a valid signature. (Accepting unsigned deliveries
/// with a warning would let anyone mark cobros as paid.)
fn check_signature(state: &AppState, headers: &HeaderMap, delivery: &WebhookDelivery, resource: &str) -> std::result::Result<(), Response> {
    let secret = match state.config.payment.as_ref() {
        Some(PaymentConfig::Mercadopago(mp)) => match &mp.webhook_secret {
            Some(secret) => secret,
            None => return Ok(()),
        },
        _ => return Ok(()),
    };

    let signature = headers
        .get(signing::SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let timestamp = headers
        .get(signing::TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());

    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        warn!("Webhook delivery without signature headers rejected");
        return Err((StatusCode::UNAUTHORIZED, "missing webhook signature").into_response());
    };

    if !signing::verify(&delivery.resource_id, timestamp, &delivery.topic, resource, signature, secret) {
        warn!("Webhook delivery with invalid signature rejected");
        return Err((StatusCode::UNAUTHORIZED, "invalid webhook signature").into_response());
    }

    Ok(())
}

async fn handle(state: &AppState, headers: &HeaderMap, delivery: WebhookDelivery, resource: &str) -> Result<Response> {
    if let Err(rejection) = check_signature(state, headers, &delivery, resource) {
        return Ok(rejection);
    }

    let outcome = reconciliation::process_delivery(&state.db, state.payments.as_deref(), delivery).await?;

    Ok(match outcome {
        ReconcileOutcome::Duplicate => ack("notification already processed"),
        ReconcileOutcome::Ignored => ack("notification recorded, topic not processed"),
        ReconcileOutcome::Processed => ack("notification processed"),
        // The failure is recorded on the notification row; the provider
        // still gets its 200 so it stops retrying.
        ReconcileOutcome::Failed(_) => ack("notification received with errors"),
    })
}

#[utoipa::path(
    post,
    path = "/webhooks/mercadopago",
    tag = "webhooks",
    summary = "Payment webhook (IPN)",
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAck),
        (status = 401, description = "Missing or invalid signature"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn mercadopago_post(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    // Body format first, query format as fallback (both arrive in the wild)
    let parsed: Option<(WebhookDelivery, String)> = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|raw| {
            let resource = raw
                .get("resource")
                .and_then(|r| r.as_str())
                .unwrap_or_default()
                .to_string();
            let webhook_body: WebhookBody = serde_json::from_value(raw.clone()).ok()?;
            webhook_body.into_delivery(raw).map(|d| (d, resource))
        })
        .or_else(|| query.into_delivery().map(|d| (d, String::new())));

    let Some((delivery, resource)) = parsed else {
        info!("Unrecognized webhook delivery format");
        return Ok(ack("unrecognized notification format"));
    };

    handle(&state, &headers, delivery, &resource).await
}

#[utoipa::path(
    get,
    path = "/webhooks/mercadopago",
    tag = "webhooks",
    summary = "Payment webhook (query format)",
    params(WebhookQuery),
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAck),
        (status = 401, description = "Missing or invalid signature"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn mercadopago_get(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let Some(delivery) = query.into_delivery() else {
        info!("Unrecognized webhook delivery format");
        return Ok(ack("unrecognized notification format"));
    };

    handle(&state, &headers, delivery, "").await
}
