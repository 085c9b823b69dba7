use plate_catalog_db::models::audit::{AuditLogEventChangeModel, AuditLogEventModel};
use sqlx::Row;
use uuid::Uuid;

use crate::unit_of_work::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string};

pub async fn find_by_plate_id_impl(
    executor: &Executor,
    plate_id: Uuid,
) -> Result<Vec<AuditLogEventModel>, Box<dyn std::error::Error + Send + Sync>> {
    let query = sqlx::query_as::<_, AuditLogEventModel>(
        r#"
        SELECT id, plate_id, user_id, "timestamp", status, dedupe_key
        FROM audit_log_event
        WHERE plate_id = $1
        ORDER BY "timestamp" ASC
        "#,
    )
    .bind(plate_id);

    let mut tx = executor.tx.lock().await;
    if let Some(transaction) = tx.as_mut() {
        Ok(query.fetch_all(&mut **transaction).await?)
    } else {
        Err("Transaction has been consumed".into())
    }
}

pub async fn load_changes_impl(
    executor: &Executor,
    audit_log_event_id: Uuid,
) -> Result<Vec<AuditLogEventChangeModel>, Box<dyn std::error::Error + Send + Sync>> {
    let query = sqlx::query(
        r#"
        SELECT id, audit_log_event_id, field_name, old_value, new_value
        FROM audit_log_event_change
        WHERE audit_log_event_id = $1
        "#,
    )
    .bind(audit_log_event_id);

    let mut tx = executor.tx.lock().await;
    let rows = if let Some(transaction) = tx.as_mut() {
        query.fetch_all(&mut **transaction).await?
    } else {
        return Err("Transaction has been consumed".into());
    };

    rows.iter()
        .map(|row| {
            Ok(AuditLogEventChangeModel {
                id: row.try_get("id")?,
                audit_log_event_id: row.try_get("audit_log_event_id")?,
                field_name: get_heapless_string(row, "field_name")?,
                old_value: get_optional_heapless_string(row, "old_value")?,
                new_value: get_optional_heapless_string(row, "new_value")?,
            })
        })
        .collect()
}
