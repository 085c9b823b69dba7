use async_trait::async_trait;
use plate_catalog_db::models::audit::{AuditLogEventChangeModel, AuditLogEventModel};
use plate_catalog_db::repository::{FindByPlateId, Load, LoadBatch};
use sqlx::Postgres;
use uuid::Uuid;

use crate::unit_of_work::Executor;

/// Read side of the audit store. The write side belongs to the consumer,
/// which runs outside any unit of work.
pub struct AuditLogEventRepositoryImpl {
    pub(crate) executor: Executor,
}

impl AuditLogEventRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// The change rows owned by one audit event, in insertion order.
    pub async fn load_changes(
        &self,
        audit_log_event_id: Uuid,
    ) -> Result<Vec<AuditLogEventChangeModel>, Box<dyn std::error::Error + Send + Sync>> {
        super::find_by_plate_id::load_changes_impl(&self.executor, audit_log_event_id).await
    }
}

#[async_trait]
impl Load<Postgres, AuditLogEventModel> for AuditLogEventRepositoryImpl {
    async fn load(
        &self,
        id: Uuid,
    ) -> Result<AuditLogEventModel, Box<dyn std::error::Error + Send + Sync>> {
        let results = self.load_batch(&[id]).await?;
        results
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| "Entity not found".into())
    }
}

#[async_trait]
impl LoadBatch<Postgres, AuditLogEventModel> for AuditLogEventRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<AuditLogEventModel>>, Box<dyn std::error::Error + Send + Sync>> {
        super::load_batch::load_batch_impl(&self.executor, ids).await
    }
}

#[async_trait]
impl FindByPlateId<Postgres, AuditLogEventModel> for AuditLogEventRepositoryImpl {
    async fn find_by_plate_id(
        &self,
        plate_id: Uuid,
    ) -> Result<Vec<AuditLogEventModel>, Box<dyn std::error::Error + Send + Sync>> {
        super::find_by_plate_id::find_by_plate_id_impl(&self.executor, plate_id).await
    }
}
