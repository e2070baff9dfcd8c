//! Credit limit schedule
//!
//! Default per-tenor limits seeded at registration, tiered by salary, and the
//! single-purchase limit check used by the transaction workflow.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Amount, DomainError};

/// Tenors every customer gets a limit for
pub const TENORS: [i32; 4] = [1, 2, 3, 6];

/// Upper bound on a requested tenor. Anything above is rejected as malformed
/// before the workflow runs.
pub const MAX_TENOR_MONTHS: i32 = 120;

const LOWER_TIER_CEILING: i64 = 5_000_000;
const MIDDLE_TIER_CEILING: i64 = 10_000_000;

/// Salary band a customer falls in at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryTier {
    /// salary < 5,000,000
    Lower,
    /// 5,000,000 <= salary <= 10,000,000
    Middle,
    /// salary > 10,000,000
    Upper,
}

impl SalaryTier {
    pub fn for_salary(salary: i64) -> Self {
        if salary < LOWER_TIER_CEILING {
            SalaryTier::Lower
        } else if salary <= MIDDLE_TIER_CEILING {
            SalaryTier::Middle
        } else {
            SalaryTier::Upper
        }
    }

    fn amounts(self) -> [i64; 4] {
        match self {
            SalaryTier::Lower => [100_000, 200_000, 500_000, 700_000],
            SalaryTier::Middle => [200_000, 400_000, 800_000, 1_200_000],
            SalaryTier::Upper => [500_000, 1_000_000, 1_500_000, 2_000_000],
        }
    }

    /// Limits for this tier, ordered by tenor
    pub fn default_limits(self) -> Vec<DefaultLimit> {
        TENORS
            .iter()
            .zip(self.amounts())
            .map(|(&tenor_month, amount)| DefaultLimit {
                tenor_month,
                limit_amount: Decimal::from(amount),
            })
            .collect()
    }
}

/// One seeded limit row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLimit {
    pub tenor_month: i32,
    pub limit_amount: Decimal,
}

/// The limit is inclusive: a price equal to the limit passes.
pub fn ensure_within_limit(price: Amount, limit: Decimal) -> Result<(), DomainError> {
    if price.exceeds(limit) {
        return Err(DomainError::price_exceeds_limit(price.to_decimal(), limit));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pairs(limits: &[DefaultLimit]) -> Vec<(i32, Decimal)> {
        limits.iter().map(|l| (l.tenor_month, l.limit_amount)).collect()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(SalaryTier::for_salary(4_999_999), SalaryTier::Lower);
        assert_eq!(SalaryTier::for_salary(5_000_000), SalaryTier::Middle);
        assert_eq!(SalaryTier::for_salary(10_000_000), SalaryTier::Middle);
        assert_eq!(SalaryTier::for_salary(10_000_001), SalaryTier::Upper);
    }

    #[test]
    fn test_lower_tier_limits() {
        let limits = SalaryTier::for_salary(4_000_000).default_limits();
        assert_eq!(
            pairs(&limits),
            vec![
                (1, dec!(100000)),
                (2, dec!(200000)),
                (3, dec!(500000)),
                (6, dec!(700000)),
            ]
        );
    }

    #[test]
    fn test_middle_and_upper_tier_limits() {
        assert_eq!(
            pairs(&SalaryTier::Middle.default_limits()),
            vec![
                (1, dec!(200000)),
                (2, dec!(400000)),
                (3, dec!(800000)),
                (6, dec!(1200000)),
            ]
        );
        assert_eq!(
            pairs(&SalaryTier::Upper.default_limits()),
            vec![
                (1, dec!(500000)),
                (2, dec!(1000000)),
                (3, dec!(1500000)),
                (6, dec!(2000000)),
            ]
        );
    }

    #[test]
    fn test_limit_check_is_inclusive() {
        let limit = dec!(500000.00);

        assert!(ensure_within_limit(Amount::new(500_000).unwrap(), limit).is_ok());
        assert_eq!(
            ensure_within_limit(Amount::new(500_001).unwrap(), limit),
            Err(DomainError::PriceExceedsLimit {
                price: dec!(500001),
                limit,
            })
        );
    }
}
