//! Session Repository
//!
//! Opaque bearer tokens are stored only as their SHA-256 hex digest.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::auth::TokenType;

use super::StorageError;

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        token_hash: &str,
        customer_id: i64,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO customer_sessions (token_hash, customer_id, token_type, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token_hash)
        .bind(customer_id)
        .bind(token_type.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Customer owning an unexpired session of the given type
    pub async fn find_active_customer(
        &self,
        token_hash: &str,
        token_type: TokenType,
    ) -> Result<Option<i64>, StorageError> {
        let customer_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT customer_id FROM customer_sessions
            WHERE token_hash = $1 AND token_type = $2 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .bind(token_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer_id)
    }

    /// Revoke every session of one type for a customer
    pub async fn revoke_all(
        &self,
        customer_id: i64,
        token_type: TokenType,
    ) -> Result<u64, StorageError> {
        let rows = sqlx::query(
            "DELETE FROM customer_sessions WHERE customer_id = $1 AND token_type = $2",
        )
        .bind(customer_id)
        .bind(token_type.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }

    pub async fn cleanup_expired(&self) -> Result<u64, StorageError> {
        let rows = sqlx::query("DELETE FROM customer_sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows)
    }
}
