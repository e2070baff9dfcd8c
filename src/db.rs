//! Database module
//!
//! Connection checks and schema bootstrap.

use sqlx::{Executor, PgPool};

/// Idempotent DDL for every table the service uses
pub const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Arbitrary key for `pg_advisory_xact_lock`
const SCHEMA_LOCK_KEY: i64 = 0x6d66_0001;

const REQUIRED_TABLES: &[&str] = &[
    "customers",
    "credit_limits",
    "transactions",
    "customer_sessions",
    "idempotency_keys",
];

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Apply the schema. Safe to run repeatedly; concurrent callers are
/// serialized on an advisory lock held for the transaction.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    (&mut *tx).execute(SCHEMA).await?;

    tx.commit().await?;
    tracing::info!("Database schema applied");
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
