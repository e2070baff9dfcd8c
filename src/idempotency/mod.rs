//! Idempotency module
//!
//! Makes transaction-creation retries safe using caller-supplied keys.

mod repository;

pub use repository::{
    IdempotencyError, IdempotencyKey, IdempotencyRepository, IdempotencyStatus,
    DEFAULT_KEY_TTL_HOURS,
};
