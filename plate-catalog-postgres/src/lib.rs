pub mod auditing;
pub mod bus;
pub mod catalog_service;
pub mod consumer;
pub mod postgres_repositories;
pub mod repository;
pub mod unit_of_work;
pub mod utils;

pub use auditing::PlateAuditInterceptor;
pub use bus::{AuditWorkHandler, InProcessAuditBus};
pub use catalog_service::CatalogService;
pub use consumer::AuditWorkItemConsumer;
pub use postgres_repositories::PostgresRepositories;
pub use unit_of_work::{ChangeTracker, Executor, UnitOfWork};

#[cfg(test)]
pub mod test_helper;
