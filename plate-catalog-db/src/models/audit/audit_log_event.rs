use chrono::{DateTime, Utc};
use plate_catalog_api::domain::audit::AuditAction;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::Identifiable;

/// # Documentation
/// - Durable record of one captured change set on a plate.
/// - Created exactly once per consumed `AuditWorkItem`, with a fresh id at
///   persist time. Never updated afterwards.
/// - Exclusively owns its `audit_log_event_change` rows (cascade delete).
/// - `dedupe_key` is a deterministic hash of the consumed work item; a unique
///   index on it makes broker redelivery idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEventModel {
    pub id: Uuid,
    pub plate_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: AuditAction,
    pub dedupe_key: i64,
}

impl Identifiable for AuditLogEventModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
