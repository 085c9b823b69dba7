use sqlx::PgPool;
use std::sync::Arc;

use crate::auditing::PlateAuditInterceptor;
use crate::repository::audit::AuditLogEventRepositoryImpl;
use crate::repository::plate_repository::PlateRepositoryImpl;
use crate::unit_of_work::UnitOfWork;

/// Entry point for persistence: holds the pool and the audit interceptor and
/// opens units of work whose repositories share one transaction.
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
    interceptor: Arc<PlateAuditInterceptor>,
}

/// One open unit of work plus the repositories bound to it.
pub struct CatalogSession {
    pub unit_of_work: UnitOfWork,
    pub plate_repository: Arc<PlateRepositoryImpl>,
    pub audit_log_event_repository: Arc<AuditLogEventRepositoryImpl>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>, interceptor: Arc<PlateAuditInterceptor>) -> Self {
        Self { pool, interceptor }
    }

    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Begin a transaction and build all repositories over its executor.
    pub async fn begin(&self) -> Result<CatalogSession, Box<dyn std::error::Error + Send + Sync>> {
        let unit_of_work = UnitOfWork::begin(&self.pool, self.interceptor.clone()).await?;
        let executor = unit_of_work.executor();

        Ok(CatalogSession {
            unit_of_work,
            plate_repository: Arc::new(PlateRepositoryImpl::new(executor.clone())),
            audit_log_event_repository: Arc::new(AuditLogEventRepositoryImpl::new(executor)),
        })
    }
}
