//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::{middleware as axum_middleware, routing::get, Router};
use chrono::Duration;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers::SessionTtl;
use crate::idempotency::DEFAULT_KEY_TTL_HOURS;

pub use routes::{create_router, public_router};

/// Shared state for every route: the pool plus the lifetimes the handlers
/// need when they write sessions or idempotency keys.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub session_ttl: SessionTtl,
    pub idempotency_key_ttl: Duration,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            session_ttl: SessionTtl {
                access: config.access_token_ttl(),
                refresh: config.refresh_token_ttl(),
            },
            idempotency_key_ttl: config.idempotency_key_ttl(),
        }
    }

    /// Default lifetimes, for tests and tools without a `Config`
    pub fn with_defaults(pool: PgPool) -> Self {
        Self {
            pool,
            session_ttl: SessionTtl::default(),
            idempotency_key_ttl: Duration::hours(DEFAULT_KEY_TTL_HOURS),
        }
    }
}

/// Build the full application: `/health` plus everything under `/api/v1`.
pub fn build_router(state: AppState) -> Router {
    // Layers run last-added first: context -> logging -> auth -> handler
    let protected_routes = create_router().layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::auth_middleware,
    ));

    let api_routes = public_router()
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
