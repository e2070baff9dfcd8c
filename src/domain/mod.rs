//! Domain module
//!
//! Core domain types and business rules: money, fees, limits, contract numbers.

pub mod amount;
pub mod context;
pub mod contract;
pub mod error;
pub mod fees;
pub mod limits;
pub mod page;
pub mod validation;

pub use amount::{Amount, AmountError};
pub use context::OperationContext;
pub use contract::contract_number;
pub use error::DomainError;
pub use fees::FeeBreakdown;
pub use limits::{ensure_within_limit, DefaultLimit, SalaryTier, MAX_TENOR_MONTHS};
pub use page::{Page, PageMeta, PageRequest};
