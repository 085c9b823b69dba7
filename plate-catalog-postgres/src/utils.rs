use blake3::Hasher as Blake3Hasher;
use heapless::String as HeaplessString;
use serde::Serialize;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;
use std::str::FromStr;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Retrieves a required `HeaplessString` from a row.
pub fn get_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<HeaplessString<N>, Box<dyn Error + Send + Sync>> {
    let s: String = row.try_get(col_name)?;
    HeaplessString::from_str(&s)
        .map_err(|_| format!("Value for column '{col_name}' is too long (max {N} chars)").into())
}

/// Retrieves an optional `HeaplessString` from a row.
pub fn get_optional_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<Option<HeaplessString<N>>, Box<dyn Error + Send + Sync>> {
    let s: Option<String> = row.try_get(col_name)?;
    s.map(|val| HeaplessString::from_str(&val))
        .transpose()
        .map_err(|_| format!("Value for column '{col_name}' is too long (max {N} chars)").into())
}

/// Deterministic 64-bit hash of a serializable value.
///
/// Used as the dedupe key for consumed audit work items: the same work item
/// always hashes to the same key, so a redelivered message collides with the
/// unique index instead of producing a second audit row.
pub fn hash_as_i64<T: Serialize>(data: &T) -> i64 {
    let mut hasher = Blake3Hasher::new();
    let json = serde_json::to_vec(data).unwrap();
    hasher.update(&json);
    let hash = hasher.finalize();
    i64::from_le_bytes(hash.as_bytes()[0..8].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plate_catalog_api::domain::audit::{AuditAction, AuditFieldChange, AuditWorkItem};
    use uuid::Uuid;

    #[test]
    fn hash_is_deterministic_per_work_item() {
        let item = AuditWorkItem {
            plate_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            timestamp_utc: Utc::now(),
            status: AuditAction::PlateReserved,
            changes: vec![AuditFieldChange::new(
                "Status",
                Some("ForSale".into()),
                Some("Reserved".into()),
            )],
        };

        assert_eq!(hash_as_i64(&item), hash_as_i64(&item.clone()));

        let mut other = item.clone();
        other.plate_id = Uuid::new_v4();
        assert_ne!(hash_as_i64(&item), hash_as_i64(&other));
    }
}
