//! Credit Limit Repository
//!
//! Per-customer, per-tenor limits. Writes and the locked lookup run inside
//! the caller's transaction; listing reads straight from the pool.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use super::StorageError;

/// One `(customer, tenor)` limit row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CreditLimit {
    pub customer_id: i64,
    pub tenor_month: i32,
    pub limit_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct CreditLimitRepository {
    pool: PgPool,
}

impl CreditLimitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one limit row. No existence check; the caller seeds each
    /// tenor exactly once.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: i64,
        tenor_month: i32,
        limit_amount: Decimal,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO credit_limits (customer_id, tenor_month, limit_amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(customer_id)
        .bind(tenor_month)
        .bind(limit_amount)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// All limits of a customer, ordered by tenor. Empty when none exist.
    pub async fn find_by_customer(&self, customer_id: i64) -> Result<Vec<CreditLimit>, StorageError> {
        let limits = sqlx::query_as::<_, CreditLimit>(
            r#"
            SELECT customer_id, tenor_month, limit_amount
            FROM credit_limits
            WHERE customer_id = $1
            ORDER BY tenor_month ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(limits)
    }

    /// Locked point read for the transaction workflow.
    ///
    /// Takes a row lock (`FOR UPDATE`) held until the caller's transaction
    /// commits or rolls back, so concurrent requests for the same
    /// `(customer, tenor)` queue behind each other here.
    ///
    /// Returns `StorageError::NotFound` for an unknown customer or tenor.
    pub async fn find_locked(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: i64,
        tenor_month: i32,
    ) -> Result<CreditLimit, StorageError> {
        let limit = sqlx::query_as::<_, CreditLimit>(
            r#"
            SELECT customer_id, tenor_month, limit_amount
            FROM credit_limits
            WHERE customer_id = $1 AND tenor_month = $2
            FOR UPDATE
            "#,
        )
        .bind(customer_id)
        .bind(tenor_month)
        .fetch_optional(&mut **tx)
        .await?;

        limit.ok_or(StorageError::NotFound)
    }
}
