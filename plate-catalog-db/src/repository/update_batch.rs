use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for updating multiple entities in a batch
///
/// Updating an entity through a unit-of-work-bound repository marks it as
/// modified in the change tracker; the pre-commit capture hook later diffs the
/// marked entities against their original snapshots.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
#[async_trait]
pub trait UpdateBatch<DB: Database, T: Identifiable>: Send + Sync {
    /// Update multiple items in a single transaction
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - A vector of updated entities
    /// * `Err` - An error if the transaction could not be executed
    async fn update_batch(
        &self,
        items: Vec<T>,
    ) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
