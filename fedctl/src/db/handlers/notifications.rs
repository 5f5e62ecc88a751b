//! Database repository for the webhook notification log.
//!
//! The log is append-only and keyed by (resource_id, topic). The unique
//! constraint is what makes duplicate deliveries idempotent: the second
//! insert loses the race and the caller short-circuits.

use crate::types::NotificationId;
use crate::db::{
    errors::Result,
    models::notifications::{NotificationCreateDBRequest, NotificationDBResponse, ProcessingStatus},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Notifications<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Notifications<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Record an inbound delivery. Returns `None` when a notification with
    /// the same (resource_id, topic) was already recorded.
    #[instrument(skip(self, request), fields(resource_id = %request.resource_id, topic = %request.topic), err)]
    pub async fn record(&mut self, request: &NotificationCreateDBRequest) -> Result<Option<NotificationDBResponse>> {
        let notification = sqlx::query_as::<_, NotificationDBResponse>(
            r#"
            INSERT INTO mercadopago_notifications (resource_id, topic, user_id, api_version, sent_at, raw_payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (resource_id, topic) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&request.resource_id)
        .bind(&request.topic)
        .bind(request.user_id)
        .bind(&request.api_version)
        .bind(request.sent_at)
        .bind(&request.raw_payload)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(notification)
    }

    /// Mark a recorded delivery as successfully processed.
    #[instrument(skip(self), err)]
    pub async fn mark_processed(&mut self, id: NotificationId, payment_status: Option<&str>) -> Result<()> {
        sqlx::query(
            "UPDATE mercadopago_notifications
             SET processing_status = 'processed', payment_status = $2, processing_error = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(payment_status)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }

    /// Record a processing failure. The delivery stays in the log so the
    /// failure is auditable; the webhook caller still gets a 200.
    #[instrument(skip(self, error), err)]
    pub async fn mark_error(&mut self, id: NotificationId, error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE mercadopago_notifications
             SET processing_status = 'error', processing_error = $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }

    /// Look up a recorded delivery by its idempotency key.
    pub async fn get_by_key(&mut self, resource_id: &str, topic: &str) -> Result<Option<NotificationDBResponse>> {
        let notification = sqlx::query_as::<_, NotificationDBResponse>(
            "SELECT * FROM mercadopago_notifications WHERE resource_id = $1 AND topic = $2",
        )
        .bind(resource_id)
        .bind(topic)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(notification)
    }

    /// List deliveries in a given processing state, oldest first.
    pub async fn list_by_status(&mut self, status: ProcessingStatus, limit: i64) -> Result<Vec<NotificationDBResponse>> {
        let notifications = sqlx::query_as::<_, NotificationDBResponse>(
            "SELECT * FROM mercadopago_notifications WHERE processing_status = $1 ORDER BY id ASC LIMIT $2",
        )
        .bind(status)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(notifications)
    }
}
