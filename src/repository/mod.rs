//! Repositories
//!
//! Postgres-backed stores. Every repository takes its `PgPool` at
//! construction; writes that belong to a workflow take the caller's open
//! `Transaction` instead of using the pool.

mod credit_limit;
mod customer;
mod error;
mod session;
mod transaction;

pub use credit_limit::{CreditLimit, CreditLimitRepository};
pub use customer::{
    Customer, CustomerCredentials, CustomerRepository, NewCustomer, EMAIL_UNIQUE_CONSTRAINT,
    NIK_UNIQUE_CONSTRAINT,
};
pub use error::StorageError;
pub use session::SessionRepository;
pub use transaction::{NewTransaction, TransactionRecord, TransactionRepository};
