//! Scheduled Jobs
//!
//! Background jobs for periodic maintenance tasks: purging expired sessions
//! and expired idempotency keys so neither table grows without bound.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;

use crate::idempotency::{IdempotencyError, IdempotencyRepository};
use crate::repository::{SessionRepository, StorageError};

// =========================================================================
// Expired Session Cleanup Job
// =========================================================================

/// Delete access and refresh sessions past their expiry
pub async fn delete_expired_sessions(pool: &PgPool) -> Result<u64, JobError> {
    let rows_deleted = SessionRepository::new(pool.clone())
        .cleanup_expired()
        .await?;

    if rows_deleted > 0 {
        tracing::info!(rows_deleted = rows_deleted, "Deleted expired sessions");
    }

    Ok(rows_deleted)
}

// =========================================================================
// Expired Idempotency Key Deletion Job
// =========================================================================

/// Delete expired idempotency keys
/// Keys older than their expiration time (default 24 hours) are removed
pub async fn delete_expired_idempotency_keys(pool: &PgPool) -> Result<u64, JobError> {
    let rows_deleted = IdempotencyRepository::new(pool.clone())
        .cleanup_expired()
        .await?;

    if rows_deleted > 0 {
        tracing::info!(
            rows_deleted = rows_deleted,
            "Deleted expired idempotency keys"
        );
    }

    Ok(rows_deleted)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for session cleanup (default: 5 minutes)
    pub session_cleanup_interval: Duration,
    /// Interval for idempotency key cleanup (default: 1 hour)
    pub idempotency_cleanup_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            session_cleanup_interval: Duration::from_secs(300),
            idempotency_cleanup_interval: Duration::from_secs(3600),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    pool: PgPool,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create a new job scheduler
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::info!("Job scheduler started");

        let mut session_interval = interval(self.config.session_cleanup_interval);
        let mut idempotency_interval = interval(self.config.idempotency_cleanup_interval);

        loop {
            tokio::select! {
                _ = session_interval.tick() => {
                    if let Err(e) = delete_expired_sessions(&self.pool).await {
                        tracing::error!(error = %e, "Session cleanup failed");
                    }
                }
                _ = idempotency_interval.tick() => {
                    if let Err(e) = delete_expired_idempotency_keys(&self.pool).await {
                        tracing::error!(error = %e, "Idempotency key deletion failed");
                    }
                }
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match delete_expired_sessions(&self.pool).await {
            Ok(count) => report.sessions_deleted = count,
            Err(e) => report.errors.push(format!("Session cleanup: {}", e)),
        }

        match delete_expired_idempotency_keys(&self.pool).await {
            Ok(count) => report.idempotency_keys_deleted = count,
            Err(e) => report.errors.push(format!("Idempotency deletion: {}", e)),
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub sessions_deleted: u64,
    pub idempotency_keys_deleted: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl MaintenanceReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Idempotency store error: {0}")]
    Idempotency(#[from] IdempotencyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_scheduler_config_default() {
        let config = JobSchedulerConfig::default();
        assert_eq!(config.session_cleanup_interval, Duration::from_secs(300));
        assert_eq!(config.idempotency_cleanup_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_maintenance_report_default() {
        let report = MaintenanceReport::default();
        assert_eq!(report.sessions_deleted, 0);
        assert_eq!(report.idempotency_keys_deleted, 0);
        assert!(report.is_clean());
    }
}
