//! Storage Errors
//!
//! Error type shared by the repositories. Unique-key violations are
//! classified here from the database error, so callers match on a variant
//! instead of inspecting messages.

/// Errors that can occur in the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A unique or primary-key constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// No row matched the lookup
    #[error("Record not found")]
    NotFound,

    /// Any other database fault
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StorageError {
    /// Whether this is a unique violation on the given constraint
    pub fn is_unique_violation_on(&self, name: &str) -> bool {
        matches!(self, StorageError::UniqueViolation { constraint } if constraint == name)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                }
            }
            _ => StorageError::Database(err),
        }
    }
}
