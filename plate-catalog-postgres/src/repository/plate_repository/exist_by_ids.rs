use std::collections::HashSet;
use uuid::Uuid;

use crate::unit_of_work::Executor;

pub async fn exist_by_ids_impl(
    executor: &Executor,
    ids: &[Uuid],
) -> Result<Vec<(Uuid, bool)>, Box<dyn std::error::Error + Send + Sync>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let query = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM plate
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids);

    let mut tx = executor.tx.lock().await;
    let found: HashSet<Uuid> = if let Some(transaction) = tx.as_mut() {
        query.fetch_all(&mut **transaction).await?.into_iter().collect()
    } else {
        return Err("Transaction has been consumed".into());
    };

    Ok(ids.iter().map(|id| (*id, found.contains(id))).collect())
}
