//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations and request-shape failures.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Requested on-the-road price is above the locked credit limit
    #[error("On the road price exceeds credit limit")]
    PriceExceedsLimit { price: Decimal, limit: Decimal },

    /// Tenor outside the accepted range
    #[error("Invalid tenor: {0}")]
    InvalidTenor(i32),

    /// Invalid amount (zero, negative, or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A request field failed validation
    #[error("Invalid field '{field}': {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl DomainError {
    /// Create a price-over-limit error
    pub fn price_exceeds_limit(price: Decimal, limit: Decimal) -> Self {
        Self::PriceExceedsLimit { price, limit }
    }

    /// Create a field validation error
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<super::AmountError> for DomainError {
    fn from(err: super::AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_exceeds_limit_error() {
        let err = DomainError::price_exceeds_limit(Decimal::new(500_001, 0), Decimal::new(500_000, 0));

        assert_eq!(err.to_string(), "On the road price exceeds credit limit");
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = DomainError::validation("nik", "must be exactly 16 digits");

        assert!(err.to_string().contains("nik"));
        assert!(err.to_string().contains("16 digits"));
    }

    #[test]
    fn test_amount_error_conversion() {
        let err: DomainError = super::super::AmountError::NotPositive(0).into();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
    }
}
