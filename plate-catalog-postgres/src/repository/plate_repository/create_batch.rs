use plate_catalog_api::domain::plate::Plate;

use crate::unit_of_work::Executor;

pub async fn create_batch_impl(
    executor: &Executor,
    items: Vec<Plate>,
) -> Result<Vec<Plate>, Box<dyn std::error::Error + Send + Sync>> {
    for plate in &items {
        let query = sqlx::query(
            r#"
            INSERT INTO plate (id, registration, purchase_price, sale_price, letters, numbers,
                               status, reserved_date, sold_date, sold_price, promo_code_used)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(plate.id)
        .bind(plate.registration.as_str())
        .bind(plate.purchase_price)
        .bind(plate.sale_price)
        .bind(plate.letters.as_str())
        .bind(plate.numbers)
        .bind(plate.status)
        .bind(plate.reserved_date)
        .bind(plate.sold_date)
        .bind(plate.sold_price)
        .bind(plate.promo_code_used.as_deref());

        let mut tx = executor.tx.lock().await;
        if let Some(transaction) = tx.as_mut() {
            query.execute(&mut **transaction).await?;
        } else {
            return Err("Transaction has been consumed".into());
        }
    }

    // Created plates are tracked unchanged: a create alone produces no audit
    // deltas, but a later update in the same transaction diffs against the
    // created values.
    {
        let mut tracker = executor.tracker.lock();
        for plate in &items {
            tracker.track(plate);
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use plate_catalog_api::domain::plate::{Plate, PlateStatus};
    use plate_catalog_db::repository::{CreateBatch, ExistByIds, Load};
    use rust_decimal::Decimal;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn test_create_and_load_plate() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let session = ctx.repos.begin().await?;
        let repo = &session.plate_repository;

        let plate = Plate::new("XY99 ZZZ", "XYZ", 99, Decimal::from(250))?;
        let plate_id = plate.id;
        repo.create_batch(vec![plate]).await?;

        let loaded = repo.load(plate_id).await?;
        assert_eq!(loaded.id, plate_id);
        assert_eq!(loaded.status, PlateStatus::ForSale);
        assert_eq!(loaded.sale_price, Decimal::from(300));

        let exists = repo.exist_by_ids(&[plate_id]).await?;
        assert_eq!(exists, vec![(plate_id, true)]);

        session.unit_of_work.rollback().await?;
        Ok(())
    }
}
