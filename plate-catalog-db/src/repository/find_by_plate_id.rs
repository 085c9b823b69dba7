use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Repository trait for the audit read side: all records attached to one
/// plate, ordered by capture timestamp.
#[async_trait]
pub trait FindByPlateId<DB: Database, T: Identifiable>: Send + Sync {
    /// Find all entities recorded against the given plate
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - Matching entities, oldest first; empty if none exist
    /// * `Err` - An error if the query could not be executed
    async fn find_by_plate_id(
        &self,
        plate_id: Uuid,
    ) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
