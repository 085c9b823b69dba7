use uuid::Uuid;

/// Trait for entities that can be uniquely identified by a UUID
pub trait Identifiable {
    /// Returns the unique identifier of the entity
    fn get_id(&self) -> Uuid;
}

impl Identifiable for plate_catalog_api::domain::plate::Plate {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
