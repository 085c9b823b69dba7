use plate_catalog_api::domain::plate::Plate;

use crate::unit_of_work::Executor;

pub async fn update_batch_impl(
    executor: &Executor,
    items: Vec<Plate>,
) -> Result<Vec<Plate>, Box<dyn std::error::Error + Send + Sync>> {
    for plate in &items {
        let query = sqlx::query(
            r#"
            UPDATE plate
            SET registration = $2, purchase_price = $3, sale_price = $4, letters = $5,
                numbers = $6, status = $7, reserved_date = $8, sold_date = $9,
                sold_price = $10, promo_code_used = $11
            WHERE id = $1
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
            let result = query.execute(&mut **transaction).await?;
            if result.rows_affected() == 0 {
                return Err(format!("plate {} not found for update", plate.id).into());
            }
        } else {
            return Err("Transaction has been consumed".into());
        }
    }

    {
        let mut tracker = executor.tracker.lock();
        for plate in &items {
            tracker.mark_modified(plate);
        }
    }

    Ok(items)
}
