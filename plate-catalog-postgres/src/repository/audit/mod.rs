pub mod audit_log_event_repository;

pub use audit_log_event_repository::AuditLogEventRepositoryImpl;
