//! Amount type
//!
//! Domain primitive for monetary amounts expressed in whole currency units.
//! Request inputs (prices, salaries) are validated at construction time, so
//! an invalid amount never reaches the transaction workflow. Storage uses
//! NUMERIC columns, hence the conversion to `Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted amount (1 trillion)
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amount represents a validated monetary value in whole currency units.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use multifinance::domain::Amount;
///
/// let price = Amount::new(500_000).unwrap();
/// assert_eq!(price.value(), 500_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }

        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Value as a `Decimal`, for NUMERIC columns.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Whether this amount is strictly greater than `limit`.
    /// Equal values are within the limit.
    pub fn exceeds(&self, limit: Decimal) -> bool {
        self.to_decimal() > limit
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
