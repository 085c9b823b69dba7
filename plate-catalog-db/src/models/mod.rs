pub mod audit;
pub mod identifiable;

// Re-exports
pub use audit::*;
pub use identifiable::*;
