//! Database models for the inbound webhook notification log.

use crate::types::NotificationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Internal processing state of a recorded webhook delivery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "processing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processed,
    Error,
}

#[derive(Debug, Clone)]
pub struct NotificationCreateDBRequest {
    pub resource_id: String,
    pub topic: String,
    pub user_id: Option<i64>,
    pub api_version: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub raw_payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationDBResponse {
    pub id: NotificationId,
    pub resource_id: String,
    pub topic: String,
    pub user_id: Option<i64>,
    pub api_version: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub processing_status: ProcessingStatus,
    pub processing_error: Option<String>,
    pub raw_payload: Option<serde_json::Value>,
    pub payment_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
