pub mod audit_log_event;
pub mod audit_log_event_change;

// Re-exports
pub use audit_log_event::*;
pub use audit_log_event_change::*;
