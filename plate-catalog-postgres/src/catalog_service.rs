use plate_catalog_api::domain::plate::Plate;
use plate_catalog_api::service::pricing::apply_promo_code;
use plate_catalog_db::repository::{CreateBatch, Load, UpdateBatch};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres_repositories::PostgresRepositories;

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Business operations over the plate catalog.
///
/// Each mutation runs in its own unit of work; committing it drives the audit
/// capture/flush hooks. Domain errors (`InvalidStateTransition`,
/// `PriceBelowMinimum`, `InvalidPromoCode`) surface to the caller; audit-path
/// failures never do.
pub struct CatalogService {
    repos: Arc<PostgresRepositories>,
}

impl CatalogService {
    pub fn new(repos: Arc<PostgresRepositories>) -> Self {
        Self { repos }
    }

    pub async fn create_plate(
        &self,
        registration: &str,
        letters: &str,
        numbers: i32,
        purchase_price: Decimal,
    ) -> ServiceResult<Plate> {
        let plate = Plate::new(registration, letters, numbers, purchase_price)?;

        let session = self.repos.begin().await?;
        let mut created = session.plate_repository.create_batch(vec![plate]).await?;
        session.unit_of_work.commit().await?;

        created.pop().ok_or_else(|| "create returned no rows".into())
    }

    pub async fn get_plate(&self, id: Uuid) -> ServiceResult<Plate> {
        let session = self.repos.begin().await?;
        let plate = session.plate_repository.load(id).await?;
        session.unit_of_work.rollback().await?;
        Ok(plate)
    }

    pub async fn reserve_plate(&self, id: Uuid) -> ServiceResult<Plate> {
        let session = self.repos.begin().await?;

        let mut plate = session.plate_repository.load(id).await?;
        plate.reserve()?;

        let mut updated = session.plate_repository.update_batch(vec![plate]).await?;
        session.unit_of_work.commit().await?;

        let plate: Plate = updated.pop().ok_or("update returned no rows")?;
        tracing::info!(plate_id = %plate.id, registration = %plate.registration, "plate reserved");
        Ok(plate)
    }

    pub async fn unreserve_plate(&self, id: Uuid) -> ServiceResult<Plate> {
        let session = self.repos.begin().await?;

        let mut plate = session.plate_repository.load(id).await?;
        plate.unreserve()?;

        let mut updated = session.plate_repository.update_batch(vec![plate]).await?;
        session.unit_of_work.commit().await?;

        let plate: Plate = updated.pop().ok_or("update returned no rows")?;
        tracing::info!(plate_id = %plate.id, registration = %plate.registration, "plate unreserved");
        Ok(plate)
    }

    /// Sell a reserved plate, applying an optional promo code to the computed
    /// sale price. The discounted price still has to clear the 90% floor.
    pub async fn sell_plate(&self, id: Uuid, promo_code: Option<&str>) -> ServiceResult<Plate> {
        let session = self.repos.begin().await?;

        let mut plate = session.plate_repository.load(id).await?;
        let sale_price = plate.calculate_sale_price();
        let final_price = apply_promo_code(sale_price, promo_code)?;
        plate.sell(final_price, promo_code)?;

        let mut updated = session.plate_repository.update_batch(vec![plate]).await?;
        session.unit_of_work.commit().await?;

        let plate: Plate = updated.pop().ok_or("update returned no rows")?;
        tracing::info!(
            plate_id = %plate.id,
            registration = %plate.registration,
            final_price = %final_price,
            original_price = %sale_price,
            promo_code = promo_code.unwrap_or("None"),
            "plate sold"
        );
        Ok(plate)
    }

    /// Quote the price for a plate under an optional promo code, without
    /// changing any state.
    pub async fn calculate_price(&self, id: Uuid, promo_code: Option<&str>) -> ServiceResult<Decimal> {
        let plate = self.get_plate(id).await?;
        Ok(apply_promo_code(plate.calculate_sale_price(), promo_code)?)
    }
}
