use plate_catalog_db::models::audit::AuditLogEventModel;
use uuid::Uuid;

use crate::unit_of_work::Executor;

pub async fn load_batch_impl(
    executor: &Executor,
    ids: &[Uuid],
) -> Result<Vec<Option<AuditLogEventModel>>, Box<dyn std::error::Error + Send + Sync>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let query = sqlx::query_as::<_, AuditLogEventModel>(
        r#"
        SELECT id, plate_id, user_id, "timestamp", status, dedupe_key
        FROM audit_log_event
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

    let mut map: std::collections::HashMap<Uuid, AuditLogEventModel> =
        rows.into_iter().map(|model| (model.id, model)).collect();

    Ok(ids.iter().map(|id| map.remove(id)).collect())
}
