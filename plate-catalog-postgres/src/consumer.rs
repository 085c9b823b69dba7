use async_trait::async_trait;
use plate_catalog_api::domain::audit::AuditWorkItem;
use plate_catalog_db::models::audit::AuditLogEventChangeModel;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::bus::AuditWorkHandler;
use crate::utils::hash_as_i64;

/// Persists published audit work items as durable audit records.
///
/// Each invocation opens its own transaction on its own pool, independent of
/// the business write that produced the item. Fresh record ids are generated
/// here, at persist time. On failure the error is logged and returned so the
/// bus redelivers; the dedupe key makes that redelivery idempotent.
pub struct AuditWorkItemConsumer {
    pool: Arc<PgPool>,
}

impl AuditWorkItemConsumer {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn consume(
        &self,
        item: &AuditWorkItem,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.persist(item).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!(plate_id = %item.plate_id, "duplicate audit work item skipped");
                Ok(())
            }
            Err(e) => {
                tracing::error!(plate_id = %item.plate_id, error = %e, "failed to persist audit event");
                Err(e)
            }
        }
    }

    /// Returns `Ok(false)` when the dedupe key already exists and nothing was
    /// written.
    async fn persist(
        &self,
        item: &AuditWorkItem,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let dedupe_key = hash_as_i64(item);
        let event_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO audit_log_event (id, plate_id, user_id, "timestamp", status, dedupe_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (dedupe_key) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(event_id)
        .bind(item.plate_id)
        .bind(item.user_id)
        .bind(item.timestamp_utc)
        .bind(item.status)
        .bind(dedupe_key)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        for change in &item.changes {
            let row = AuditLogEventChangeModel::from_field_change(event_id, change)?;
            sqlx::query(
                r#"
                INSERT INTO audit_log_event_change (id, audit_log_event_id, field_name, old_value, new_value)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(row.id)
            .bind(row.audit_log_event_id)
            .bind(row.field_name.as_str())
            .bind(row.old_value.as_deref())
            .bind(row.new_value.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl AuditWorkHandler for AuditWorkItemConsumer {
    async fn handle(
        &self,
        item: &AuditWorkItem,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.consume(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helper::setup_test_context;
    use chrono::Utc;
    use plate_catalog_api::domain::audit::{AuditAction, AuditFieldChange};
    use plate_catalog_db::repository::{FindByPlateId, Load};
    use serial_test::serial;

    fn reserved_work_item() -> AuditWorkItem {
        AuditWorkItem {
            plate_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            timestamp_utc: Utc::now(),
            status: AuditAction::PlateReserved,
            changes: vec![
                AuditFieldChange::new("Status", Some("ForSale".into()), Some("Reserved".into())),
                AuditFieldChange::new("ReservedDate", None, Some("2026-08-29T10:00:00+00:00".into())),
            ],
        }
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn consume_round_trips_every_change_row(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let consumer = AuditWorkItemConsumer::new(ctx.pool.clone());

        let item = reserved_work_item();
        consumer.consume(&item).await?;

        let session = ctx.repos.begin().await?;
        let events = session
            .audit_log_event_repository
            .find_by_plate_id(item.plate_id)
            .await?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, item.user_id);
        assert_eq!(events[0].status, AuditAction::PlateReserved);

        // Loading the event by id returns the same row as the plate index.
        let by_id = session
            .audit_log_event_repository
            .load(events[0].id)
            .await?;
        assert_eq!(by_id.plate_id, item.plate_id);
        assert_eq!(by_id.dedupe_key, events[0].dedupe_key);

        let changes = session
            .audit_log_event_repository
            .load_changes(events[0].id)
            .await?;
        assert_eq!(changes.len(), item.changes.len());
        for (row, change) in changes.iter().zip(&item.changes) {
            assert_eq!(row.field_name.as_str(), change.field_name);
            assert_eq!(row.old_value.as_deref(), change.old_value.as_deref());
            assert_eq!(row.new_value.as_deref(), change.new_value.as_deref());
        }

        session.unit_of_work.rollback().await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn redelivered_work_item_is_not_persisted_twice(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let consumer = AuditWorkItemConsumer::new(ctx.pool.clone());

        let item = reserved_work_item();
        consumer.consume(&item).await?;
        // Broker redelivery of the identical message.
        consumer.consume(&item).await?;

        let session = ctx.repos.begin().await?;
        let events = session
            .audit_log_event_repository
            .find_by_plate_id(item.plate_id)
            .await?;
        assert_eq!(events.len(), 1);

        session.unit_of_work.rollback().await?;
        Ok(())
    }
}
