pub mod audit;
pub mod classify;
pub mod diff;
pub mod plate;

// Re-exports
pub use audit::*;
pub use classify::*;
pub use diff::*;
pub use plate::*;
