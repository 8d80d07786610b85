use thiserror::Error;

use forgecast_core::{DomainError, ProductId};

/// Failures surfaced by the forecasting engine.
///
/// Thin histories and zero-variance fits are not errors: they select a
/// fallback path and still produce a result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("inventory store failed: {0}")]
    Store(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ForecastError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Map a collaborator failure for `product_id`.
    pub(crate) fn from_store(product_id: ProductId, err: DomainError) -> Self {
        match err {
            DomainError::NotFound => Self::ProductNotFound(product_id),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<DomainError> for ForecastError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::InvalidInput(msg),
            other => Self::Store(other.to_string()),
        }
    }
}
