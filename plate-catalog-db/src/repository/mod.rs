pub mod create_batch;
pub mod exist_by_ids;
pub mod find_by_plate_id;
pub mod load;
pub mod load_batch;
pub mod update_batch;

// Re-exports
pub use create_batch::*;
pub use exist_by_ids::*;
pub use find_by_plate_id::*;
pub use load::*;
pub use load_batch::*;
pub use update_batch::*;
