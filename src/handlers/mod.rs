//! Command Handlers module
//!
//! Handlers that orchestrate business operations over the repositories.
//! Each one is built per request from the shared pool.

mod auth_handler;
mod commands;
mod customer_handler;
mod transaction_handler;


pub use auth_handler::{AuthHandler, SessionTtl};
pub use commands::*;
pub use customer_handler::{CustomerProfile, CustomerQueryHandler, RegisterCustomerHandler};
pub use transaction_handler::{CreateTransactionHandler, TransactionQueryHandler, WorkflowStage};
