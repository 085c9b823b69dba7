use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for loading multiple entities by their IDs
///
/// Results come back in the same order as the input ids, with `None` for ids
/// that do not exist.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
#[async_trait]
pub trait LoadBatch<DB: Database, T: Identifiable>: Send + Sync {
    /// Load multiple entities by their unique identifiers
    ///
    /// # Returns
    /// * `Ok(Vec<Option<T>>)` - One slot per requested id, in input order
    /// * `Err` - An error if the query could not be executed
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
