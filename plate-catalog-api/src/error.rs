use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::plate::PlateStatus;

/// Domain errors raised by plate state transitions. These are the only errors
/// surfaced to the caller of a business operation; everything on the audit
/// path is logged and isolated from the business write.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlateError {
    #[error("cannot {operation} plate in {current} status")]
    InvalidStateTransition {
        current: PlateStatus,
        operation: &'static str,
    },

    #[error("sale price {offered} is below the minimum allowed price of {minimum} (90% of sale price)")]
    PriceBelowMinimum { offered: Decimal, minimum: Decimal },

    #[error("invalid promo code: {0}")]
    InvalidPromoCode(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Domain(#[from] PlateError),
}

pub type ApiResult<T> = Result<T, ApiError>;
pub type PlateResult<T> = Result<T, PlateError>;
