pub mod current_user;
pub mod pricing;
pub mod publisher;

// Re-exports
pub use current_user::*;
pub use pricing::*;
pub use publisher::*;
