use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for loading entities by their ID
///
/// Any entity that implements the Identifiable trait can be loaded using this
/// trait. Loading a plate through a unit-of-work-bound repository also
/// registers its original snapshot with the change tracker, which is what
/// makes subsequent updates diffable at commit time.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
#[async_trait]
pub trait Load<DB: Database, T: Identifiable>: Send + Sync {
    /// Load an entity by its unique identifier
    ///
    /// # Returns
    /// * `Ok(T)` - The loaded entity
    /// * `Err` - An error if the entity could not be loaded
    async fn load(&self, id: Uuid) -> Result<T, Box<dyn std::error::Error + Send + Sync>>;
}
