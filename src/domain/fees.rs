//! Fee and interest calculation
//!
//! Pure functions over whole currency units. Every division truncates
//! toward zero; inputs are non-negative so that is the same as flooring.

use serde::Serialize;

/// Admin fee percentage of the on-the-road price
pub const ADMIN_FEE_PERCENT: i64 = 2;

/// Admin fee floor
pub const MIN_ADMIN_FEE: i64 = 50_000;

/// Flat monthly interest percentage
pub const MONTHLY_INTEREST_PERCENT: i64 = 1;

/// `max(price * 2%, 50_000)`
pub fn admin_fee(price: i64) -> i64 {
    (price * ADMIN_FEE_PERCENT / 100).max(MIN_ADMIN_FEE)
}

/// Simple interest: `price * 1% * tenor`
pub fn interest(price: i64, tenor_month: i32) -> i64 {
    price * MONTHLY_INTEREST_PERCENT * i64::from(tenor_month) / 100
}

/// `(price + interest) / tenor`
///
/// `tenor_month` must be positive; request validation rejects anything else
/// before the workflow runs.
pub fn installment(price: i64, interest_amount: i64, tenor_month: i32) -> i64 {
    debug_assert!(tenor_month > 0, "tenor_month must be positive");
    (price + interest_amount) / i64::from(tenor_month)
}

/// Derived amounts for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub admin_fee: i64,
    pub interest_amount: i64,
    pub installment_amount: i64,
}

impl FeeBreakdown {
    pub fn compute(price: i64, tenor_month: i32) -> Self {
        let interest_amount = interest(price, tenor_month);
        Self {
            admin_fee: admin_fee(price),
            interest_amount,
            installment_amount: installment(price, interest_amount, tenor_month),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_fee_floor_applies() {
        // 2% of 100_000 is 2_000, below the floor
        assert_eq!(admin_fee(100_000), 50_000);
        // 2% of 1_000_000 is 20_000, still below the floor
        assert_eq!(admin_fee(1_000_000), 50_000);
        assert_eq!(admin_fee(2_500_000), 50_000);
    }

    #[test]
    fn test_admin_fee_percentage_above_floor() {
        assert_eq!(admin_fee(2_500_050), 50_001);
        assert_eq!(admin_fee(5_000_000), 100_000);
    }

    #[test]
    fn test_admin_fee_truncates() {
        // 2% of 3_333_333 = 66_666.66
        assert_eq!(admin_fee(3_333_333), 66_666);
    }

    #[test]
    fn test_interest() {
        assert_eq!(interest(500_000, 12), 60_000);
        assert_eq!(interest(500_000, 3), 15_000);
        // 1% of 12_345 over 1 month = 123.45
        assert_eq!(interest(12_345, 1), 123);
    }

    #[test]
    fn test_installment_truncates() {
        // 560_000 / 12 = 46_666.67
        assert_eq!(installment(500_000, 60_000, 12), 46_666);
        assert_eq!(installment(500_000, 15_000, 3), 171_666);
    }

    #[test]
    fn test_breakdown_for_limit_boundary() {
        let fees = FeeBreakdown::compute(500_000, 3);

        assert_eq!(
            fees,
            FeeBreakdown {
                admin_fee: 50_000,
                interest_amount: 15_000,
                installment_amount: 171_666,
            }
        );
    }

    #[test]
    fn test_single_month_tenor_pays_everything_at_once() {
        let fees = FeeBreakdown::compute(100_000, 1);
        assert_eq!(fees.interest_amount, 1_000);
        assert_eq!(fees.installment_amount, 101_000);
    }
}
