pub mod audit;
pub mod plate_repository;
