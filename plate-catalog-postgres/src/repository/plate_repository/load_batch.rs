use plate_catalog_api::domain::plate::Plate;
use uuid::Uuid;

use crate::unit_of_work::Executor;
use crate::utils::TryFromRow;

pub async fn load_batch_impl(
    executor: &Executor,
    ids: &[Uuid],
) -> Result<Vec<Option<Plate>>, Box<dyn std::error::Error + Send + Sync>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let query = sqlx::query(
        r#"
        SELECT id, registration, purchase_price, sale_price, letters, numbers,
               status, reserved_date, sold_date, sold_price, promo_code_used
        FROM plate
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids);

    let mut tx = executor.tx.lock().await;
    let rows = if let Some(transaction) = tx.as_mut() {
        query.fetch_all(&mut **transaction).await?
    } else {
        return Err("Transaction has been consumed".into());
    };
    drop(tx);

    let mut map: std::collections::HashMap<Uuid, Plate> = std::collections::HashMap::new();
    for row in &rows {
        let plate = Plate::try_from_row(row)?;

        // The tracker snapshot is the as-stored value; the staleness fixup
        // below applies only to the returned copy, so a write-back of the
        // refreshed price shows up as an auditable delta.
        executor.tracker.lock().track(&plate);

        let mut returned = plate;
        returned.refresh_sale_price();
        map.insert(returned.id, returned);
    }

    Ok(ids.iter().map(|id| map.remove(id)).collect())
}
