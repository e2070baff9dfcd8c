//! Contract numbers
//!
//! `TRX` + creation date (`YYYYMMDD`) + customer id zero-padded to 4 digits.
//! The scheme repeats when a customer buys twice on the same day.

use chrono::NaiveDate;

pub const CONTRACT_PREFIX: &str = "TRX";

pub fn contract_number(customer_id: i64, date: NaiveDate) -> String {
    format!("{}{}{:04}", CONTRACT_PREFIX, date.format("%Y%m%d"), customer_id)
}
