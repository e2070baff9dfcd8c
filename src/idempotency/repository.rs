//! Idempotency Repository
//!
//! Caller-supplied keys for transaction creation. A key is recorded in the
//! same database transaction as the transaction row it produced, so a key
//! exists if and only if its transaction was committed.

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Lifetime of a recorded key unless configured otherwise
pub const DEFAULT_KEY_TTL_HOURS: i64 = 24;

/// Primary key of `idempotency_keys`; a concurrent duplicate insert
/// violates it.
const IDEMPOTENCY_PKEY: &str = "idempotency_keys_pkey";

/// Stored idempotency key information
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdempotencyKey {
    pub key: Uuid,
    pub customer_id: i64,
    pub request_hash: String,
    pub transaction_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IdempotencyKey {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Outcome of looking up a key before doing any work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyStatus {
    /// Unknown (or expired) key: run the workflow and record it
    Fresh,
    /// Same request seen before: replay the stored transaction
    Completed { transaction_id: i64 },
}

/// Idempotency Repository Error
#[derive(Debug, thiserror::Error)]
pub enum IdempotencyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request hash mismatch for key {0}")]
    HashMismatch(Uuid),

    #[error("Key {0} was recorded by a concurrent request")]
    ConcurrentDuplicate(Uuid),
}

/// Repository for managing idempotency keys
#[derive(Debug, Clone)]
pub struct IdempotencyRepository {
    pool: PgPool,
    ttl: Duration,
}

impl IdempotencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ttl: Duration::hours(DEFAULT_KEY_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Look up a key for this customer inside the workflow transaction.
    ///
    /// An expired key that the cleanup job has not purged yet is deleted here
    /// and treated as fresh.
    pub async fn check(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: i64,
        key: Uuid,
        request_hash: &str,
    ) -> Result<IdempotencyStatus, IdempotencyError> {
        let existing = sqlx::query_as::<_, IdempotencyKey>(
            r#"
            SELECT key, customer_id, request_hash, transaction_id, created_at, expires_at
            FROM idempotency_keys
            WHERE customer_id = $1 AND key = $2
            "#,
        )
        .bind(customer_id)
        .bind(key)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(existing) = existing else {
            return Ok(IdempotencyStatus::Fresh);
        };

        if existing.is_expired(Utc::now()) {
            sqlx::query("DELETE FROM idempotency_keys WHERE customer_id = $1 AND key = $2")
                .bind(customer_id)
                .bind(key)
                .execute(&mut **tx)
                .await?;
            return Ok(IdempotencyStatus::Fresh);
        }

        if existing.request_hash != request_hash {
            return Err(IdempotencyError::HashMismatch(key));
        }

        Ok(IdempotencyStatus::Completed {
            transaction_id: existing.transaction_id,
        })
    }

    // =========================================================================
    // Record
    // =========================================================================

    /// Record the key alongside the transaction it produced.
    pub async fn record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: i64,
        key: Uuid,
        request_hash: &str,
        transaction_id: i64,
    ) -> Result<(), IdempotencyError> {
        let expires_at = Utc::now() + self.ttl;

        sqlx::query(
            r#"
            INSERT INTO idempotency_keys (key, customer_id, request_hash, transaction_id, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(key)
        .bind(customer_id)
        .bind(request_hash)
        .bind(transaction_id)
        .bind(expires_at)
        .execute(&mut **tx)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() && db_err.constraint() == Some(IDEMPOTENCY_PKEY) =>
            {
                IdempotencyError::ConcurrentDuplicate(key)
            }
            _ => IdempotencyError::Database(err),
        })?;

        Ok(())
    }

    /// Delete expired idempotency keys
    pub async fn cleanup_expired(&self) -> Result<u64, IdempotencyError> {
        let rows = sqlx::query(
            r#"
            DELETE FROM idempotency_keys
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }

    /// Compute SHA-256 hash of the canonical request for conflict detection
    pub fn compute_request_hash(body: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(body);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_request_hash() {
        let body = b"{\"otr\":500000,\"tenor\":3}";
        let hash = IdempotencyRepository::compute_request_hash(body);

        // Hash should be 64 hex characters (SHA-256)
        assert_eq!(hash.len(), 64);

        let hash2 = IdempotencyRepository::compute_request_hash(body);
        assert_eq!(hash, hash2);

        let hash3 = IdempotencyRepository::compute_request_hash(b"{\"otr\":500001,\"tenor\":3}");
        assert_ne!(hash, hash3);
    }

    #[test]
    fn test_key_expiry() {
        let now = Utc::now();
        let key = IdempotencyKey {
            key: Uuid::new_v4(),
            customer_id: 1,
            request_hash: "a".repeat(64),
            transaction_id: 10,
            created_at: now - Duration::hours(25),
            expires_at: now - Duration::hours(1),
        };
        assert!(key.is_expired(now));

        let live = IdempotencyKey {
            expires_at: now + Duration::hours(1),
            ..key
        };
        assert!(!live.is_expired(now));
    }

    #[test]
    fn test_idempotency_error_display() {
        let err = IdempotencyError::HashMismatch(Uuid::nil());
        assert!(err.to_string().contains("hash mismatch"));

        let err = IdempotencyError::ConcurrentDuplicate(Uuid::nil());
        assert!(err.to_string().contains("concurrent"));
    }
}
