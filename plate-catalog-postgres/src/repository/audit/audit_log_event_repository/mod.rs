pub mod find_by_plate_id;
pub mod load_batch;
pub mod repo_impl;

pub use repo_impl::AuditLogEventRepositoryImpl;
