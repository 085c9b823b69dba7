use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for creating multiple entities in a batch
///
/// All creates are performed within the repository's transaction for
/// atomicity. Returns saved items with any generated fields populated.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
#[async_trait]
pub trait CreateBatch<DB: Database, T: Identifiable>: Send + Sync {
    /// Save multiple items in a single transaction
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - A vector of created entities
    /// * `Err` - An error if the transaction could not be executed
    async fn create_batch(
        &self,
        items: Vec<T>,
    ) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
