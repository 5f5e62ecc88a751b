//! Payment webhook reconciliation.
//!
//! A delivery from the payment provider is (1) recorded idempotently in the
//! notification log, (2) resolved against the provider's API for the
//! authoritative payment state, and (3) applied to the local Pago/Cobro pair
//! in one transaction. Processing failures are recorded on the notification
//! row; the caller still acknowledges the delivery.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::{
    db::{
        handlers::{Cobros, Notifications, Pagos, Repository},
        models::{notifications::NotificationCreateDBRequest, pagos::PagoCreateDBRequest},
    },
    errors::{Error, Result},
    payment_providers::PaymentProvider,
    types::CobroId,
};

/// Topic name for payment notifications; the only topic with business effects.
pub const TOPIC_PAYMENT: &str = "payment";

/// A normalized inbound delivery (body and query formats both end up here).
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    pub resource_id: String,
    pub topic: String,
    pub user_id: Option<i64>,
    pub api_version: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub raw_payload: Option<serde_json::Value>,
}

/// What happened to a delivery. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Same (resource_id, topic) was already recorded; no business effects.
    Duplicate,
    /// Non-payment topic, recorded and acknowledged.
    Ignored,
    /// Payment resolved and applied.
    Processed,
    /// Recorded, but processing failed; the error lives on the notification row.
    Failed(String),
}

/// Extract the cobro id from an external reference of the form
/// `cobro_{id}_...`.
pub fn parse_cobro_reference(external_reference: &str) -> Option<CobroId> {
    let parts: Vec<&str> = external_reference.split('_').collect();
    if parts.len() >= 3 && parts[0] == "cobro" {
        parts[1].parse().ok()
    } else {
        None
    }
}

/// Process one webhook delivery end to end.
#[instrument(skip(db, provider, delivery), fields(resource_id = %delivery.resource_id, topic = %delivery.topic))]
pub async fn process_delivery(
    db: &PgPool,
    provider: Option<&dyn PaymentProvider>,
    delivery: WebhookDelivery,
) -> Result<ReconcileOutcome> {
    let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // Idempotency gate: the unique key on (resource_id, topic) means a
    // duplicate delivery never re-runs business effects.
    let notification = {
        let mut notifications = Notifications::new(&mut conn);
        notifications
            .record(&NotificationCreateDBRequest {
                resource_id: delivery.resource_id.clone(),
                topic: delivery.topic.clone(),
                user_id: delivery.user_id,
                api_version: delivery.api_version.clone(),
                sent_at: delivery.sent_at,
                raw_payload: delivery.raw_payload.clone(),
            })
            .await?
    };

    let Some(notification) = notification else {
        info!("Duplicate delivery, short-circuiting");
        return Ok(ReconcileOutcome::Duplicate);
    };

    if delivery.topic != TOPIC_PAYMENT {
        let mut notifications = Notifications::new(&mut conn);
        notifications.mark_processed(notification.id, None).await?;
        info!("Non-payment topic recorded without business effects");
        return Ok(ReconcileOutcome::Ignored);
    }

    // From here on, failures are recorded on the notification row and
    // reported as Failed; the webhook caller still gets its 200.
    match apply_payment(&mut conn, provider, &delivery.resource_id).await {
        Ok(payment_status) => {
            let mut notifications = Notifications::new(&mut conn);
            notifications.mark_processed(notification.id, Some(&payment_status)).await?;
            Ok(ReconcileOutcome::Processed)
        }
        Err(error) => {
            warn!("Webhook processing failed: {error}");
            let mut notifications = Notifications::new(&mut conn);
            notifications.mark_error(notification.id, &error).await?;
            Ok(ReconcileOutcome::Failed(error))
        }
    }
}

/// Fetch the authoritative payment and apply it to the Pago/Cobro pair.
/// Returns the provider status on success, or a description of the failure.
async fn apply_payment(
    conn: &mut sqlx::PgConnection,
    provider: Option<&dyn PaymentProvider>,
    payment_id: &str,
) -> std::result::Result<String, String> {
    let provider = provider.ok_or_else(|| "payment provider not configured".to_string())?;

    let payment = provider
        .get_payment(payment_id)
        .await
        .map_err(|e| format!("failed to fetch payment {payment_id}: {e}"))?;

    let external_reference = payment
        .external_reference
        .as_deref()
        .ok_or_else(|| format!("payment {payment_id} has no external reference"))?;

    let cobro_id = parse_cobro_reference(external_reference)
        .ok_or_else(|| format!("unparseable external reference '{external_reference}'"))?;

    let cobro = {
        let mut cobros = Cobros::new(conn);
        cobros
            .get_by_id(cobro_id)
            .await
            .map_err(|e| format!("failed to load cobro {cobro_id}: {e}"))?
            .ok_or_else(|| format!("cobro {cobro_id} not found"))?
    };

    let monto = payment.transaction_amount.unwrap_or(cobro.monto);
    let estado = payment.estado();

    let request = PagoCreateDBRequest {
        cobro_id: cobro.id,
        payment_id: payment.id.clone(),
        monto,
        estado,
        metodo_pago: "MercadoPago".to_string(),
        preference_id: payment.preference_id.clone(),
        datos_extra: Some(payment.raw.clone()),
        comprobante: Some(format!("MP-{}", payment.id)),
    };

    let mut pagos = Pagos::new(conn);
    pagos
        .reconcile(&request)
        .await
        .map_err(|e| format!("failed to apply payment {payment_id} to cobro {cobro_id}: {e}"))?;

    Ok(payment.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_references() {
        assert_eq!(parse_cobro_reference("cobro_12_1704067200"), Some(12));
        assert_eq!(parse_cobro_reference("cobro_1_abc_def"), Some(1));
    }

    #[test]
    fn rejects_malformed_references() {
        assert_eq!(parse_cobro_reference("cobro_12"), None);
        assert_eq!(parse_cobro_reference("pago_12_34"), None);
        assert_eq!(parse_cobro_reference("cobro_notanumber_x"), None);
        assert_eq!(parse_cobro_reference(""), None);
    }
}
