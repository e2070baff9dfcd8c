//! multifinance Library
//!
//! Installment back-office service: customer onboarding, sessions, credit
//! limits and limit-checked transaction creation. Re-exports modules for
//! the server binary, the utility binaries and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod idempotency;
pub mod jobs;
pub mod repository;

mod error;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{Config, LogFormat};
pub use domain::{Amount, AmountError, DomainError, OperationContext};
pub use error::{AppError, ErrorResponse};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "multifinance=debug,tower_http=debug";

/// Initialize tracing/logging
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Create the shared pool from configuration
pub async fn connect_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database_acquire_timeout_secs,
        ))
        .connect(&config.database_url)
        .await
}
