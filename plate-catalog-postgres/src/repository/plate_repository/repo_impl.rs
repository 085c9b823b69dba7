use async_trait::async_trait;
use plate_catalog_api::domain::plate::{Plate, PlateStatus};
use plate_catalog_db::repository::{CreateBatch, ExistByIds, Load, LoadBatch, UpdateBatch};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use crate::unit_of_work::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

/// Plate repository bound to one unit of work.
///
/// Loads register the original snapshot with the session's change tracker;
/// updates mark the entity as modified. That pairing is what the pre-commit
/// capture hook diffs.
pub struct PlateRepositoryImpl {
    pub(crate) executor: Executor,
}

impl PlateRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for Plate {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Plate {
            id: row.try_get("id")?,
            registration: get_heapless_string(row, "registration")?,
            purchase_price: row.try_get("purchase_price")?,
            sale_price: row.try_get("sale_price")?,
            letters: get_heapless_string(row, "letters")?,
            numbers: row.try_get("numbers")?,
            status: row.try_get::<PlateStatus, _>("status")?,
            reserved_date: row.try_get("reserved_date")?,
            sold_date: row.try_get("sold_date")?,
            sold_price: row.try_get("sold_price")?,
            promo_code_used: get_optional_heapless_string(row, "promo_code_used")?,
        })
    }
}

#[async_trait]
impl Load<Postgres, Plate> for PlateRepositoryImpl {
    async fn load(&self, id: Uuid) -> Result<Plate, Box<dyn std::error::Error + Send + Sync>> {
        let results = self.load_batch(&[id]).await?;
        results
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| "Entity not found".into())
    }
}

#[async_trait]
impl LoadBatch<Postgres, Plate> for PlateRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<Plate>>, Box<dyn std::error::Error + Send + Sync>> {
        super::load_batch::load_batch_impl(&self.executor, ids).await
    }
}

#[async_trait]
impl CreateBatch<Postgres, Plate> for PlateRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<Plate>,
    ) -> Result<Vec<Plate>, Box<dyn std::error::Error + Send + Sync>> {
        super::create_batch::create_batch_impl(&self.executor, items).await
    }
}

#[async_trait]
impl UpdateBatch<Postgres, Plate> for PlateRepositoryImpl {
    async fn update_batch(
        &self,
        items: Vec<Plate>,
    ) -> Result<Vec<Plate>, Box<dyn std::error::Error + Send + Sync>> {
        super::update_batch::update_batch_impl(&self.executor, items).await
    }
}

#[async_trait]
impl ExistByIds<Postgres> for PlateRepositoryImpl {
    async fn exist_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, bool)>, Box<dyn std::error::Error + Send + Sync>> {
        super::exist_by_ids::exist_by_ids_impl(&self.executor, ids).await
    }
}
