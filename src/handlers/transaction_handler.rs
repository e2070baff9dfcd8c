//! Transaction Handlers
//!
//! `CreateTransactionHandler` runs the credit-limit-constrained purchase
//! workflow inside a single database transaction:
//!
//! ```text
//! Started -> LimitLocked -> Validated -> Computed -> Inserted -> Committed
//!     \___________\______________\___________\____________> RolledBack
//! ```
//!
//! The limit row is read with `FOR UPDATE`, so the check against it and the
//! insert it guards happen under the same lock. Every failure after `begin`
//! rolls back before the error is returned.

use chrono::{Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{ensure_within_limit, FeeBreakdown, OperationContext, Page, PageRequest};
use crate::error::AppError;
use crate::idempotency::{IdempotencyRepository, IdempotencyStatus};
use crate::repository::{
    CreditLimitRepository, NewTransaction, StorageError, TransactionRecord, TransactionRepository,
};

use super::{CreateTransactionCommand, CreateTransactionResult};

/// Position of a creation request in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Started,
    LimitLocked,
    Validated,
    Computed,
    Inserted,
    Committed,
    RolledBack,
}

/// What the in-transaction steps produced
enum Outcome {
    Created(TransactionRecord),
    Replayed(TransactionRecord),
}

/// Tracks the current stage and logs each transition
struct Progress {
    stage: WorkflowStage,
    customer_id: i64,
    tenor_month: i32,
}

impl Progress {
    fn new(customer_id: i64, tenor_month: i32) -> Self {
        tracing::debug!(customer_id, tenor_month, stage = ?WorkflowStage::Started, "Workflow stage");
        Self {
            stage: WorkflowStage::Started,
            customer_id,
            tenor_month,
        }
    }

    fn advance(&mut self, next: WorkflowStage) {
        tracing::debug!(
            customer_id = self.customer_id,
            tenor_month = self.tenor_month,
            from = ?self.stage,
            stage = ?next,
            "Workflow stage"
        );
        self.stage = next;
    }
}

// =========================================================================
// CreateTransactionHandler
// =========================================================================

pub struct CreateTransactionHandler {
    pool: PgPool,
    credit_limits: CreditLimitRepository,
    transactions: TransactionRepository,
    idempotency: IdempotencyRepository,
}

impl CreateTransactionHandler {
    pub fn new(pool: PgPool, idempotency_ttl: Duration) -> Self {
        Self {
            credit_limits: CreditLimitRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            idempotency: IdempotencyRepository::new(pool.clone()).with_ttl(idempotency_ttl),
            pool,
        }
    }

    /// Execute the command for the customer in `context`
    pub async fn execute(
        &self,
        command: CreateTransactionCommand,
        context: &OperationContext,
    ) -> Result<CreateTransactionResult, AppError> {
        let customer_id = context.customer_id.ok_or(AppError::Unauthorized)?;
        command.validate()?;

        let idempotency = command
            .idempotency_key
            .map(|key| (key, command.request_hash()));

        let mut progress = Progress::new(customer_id, command.tenor_month);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("begin transaction: {}", e)))?;

        let outcome = self
            .run(&mut tx, &mut progress, &command, customer_id, idempotency.as_ref())
            .await;

        match outcome {
            Ok(Outcome::Created(record)) => {
                if let Err(e) = tx.commit().await {
                    // The server may or may not have applied the commit
                    tracing::error!(
                        customer_id,
                        tenor_month = command.tenor_month,
                        error = %e,
                        correlation_id = ?context.correlation_id,
                        "Commit failed; transaction outcome unknown"
                    );
                    return Err(AppError::Internal(format!("commit transaction: {}", e)));
                }
                progress.advance(WorkflowStage::Committed);

                tracing::info!(
                    transaction_id = record.id,
                    customer_id,
                    tenor_month = command.tenor_month,
                    contract_number = %record.contract_number,
                    correlation_id = ?context.correlation_id,
                    "Transaction created"
                );

                Ok(CreateTransactionResult::from_record(record, false))
            }
            Ok(Outcome::Replayed(record)) => {
                rollback(tx, &mut progress).await;
                tracing::info!(
                    transaction_id = record.id,
                    customer_id,
                    correlation_id = ?context.correlation_id,
                    "Idempotent replay"
                );
                Ok(CreateTransactionResult::from_record(record, true))
            }
            Err(err) => {
                rollback(tx, &mut progress).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        progress: &mut Progress,
        command: &CreateTransactionCommand,
        customer_id: i64,
        idempotency: Option<&(Uuid, String)>,
    ) -> Result<Outcome, AppError> {
        // Lock
        let limit = self
            .credit_limits
            .find_locked(tx, customer_id, command.tenor_month)
            .await
            .map_err(|e| {
                if !e.is_not_found() {
                    tracing::warn!(customer_id, tenor_month = command.tenor_month, error = %e, "Limit lock failed");
                }
                AppError::InvalidTenorOrCreditLimit
            })?;
        progress.advance(WorkflowStage::LimitLocked);

        if let Some((key, request_hash)) = idempotency {
            if let IdempotencyStatus::Completed { transaction_id } = self
                .idempotency
                .check(tx, customer_id, *key, request_hash)
                .await?
            {
                let record = self
                    .transactions
                    .find_in_tx(tx, transaction_id, customer_id)
                    .await?;
                return Ok(Outcome::Replayed(record));
            }
        }

        // Validate
        ensure_within_limit(command.on_the_road_price, limit.limit_amount)?;
        progress.advance(WorkflowStage::Validated);

        // Compute
        let price = command.on_the_road_price.value();
        let fees = FeeBreakdown::compute(price, command.tenor_month);
        log_hint_mismatch(command, &fees);
        let new_transaction = NewTransaction::new(
            customer_id,
            command.on_the_road_price,
            fees,
            command.asset_name.clone(),
            Utc::now(),
        );
        progress.advance(WorkflowStage::Computed);

        // Insert
        let record = self
            .transactions
            .insert(tx, &new_transaction)
            .await
            .map_err(|e| AppError::Internal(format!("insert transaction: {}", e)))?;

        if let Some((key, request_hash)) = idempotency {
            self.idempotency
                .record(tx, customer_id, *key, request_hash, record.id)
                .await?;
        }
        progress.advance(WorkflowStage::Inserted);

        Ok(Outcome::Created(record))
    }
}

/// Best-effort rollback. A failure here is logged and never replaces the
/// caller's error.
async fn rollback(tx: Transaction<'_, Postgres>, progress: &mut Progress) {
    let failed_at = progress.stage;
    match tx.rollback().await {
        Ok(()) => progress.advance(WorkflowStage::RolledBack),
        Err(e) => tracing::error!(
            customer_id = progress.customer_id,
            tenor_month = progress.tenor_month,
            stage = ?failed_at,
            error = %e,
            "Rollback failed"
        ),
    }
}

/// Caller figures are estimates; the computed ones are stored.
fn log_hint_mismatch(command: &CreateTransactionCommand, fees: &FeeBreakdown) {
    let installment_differs = command
        .installment_amount
        .is_some_and(|v| v != fees.installment_amount);
    let interest_differs = command
        .interest_amount
        .is_some_and(|v| v != fees.interest_amount);

    if installment_differs || interest_differs {
        tracing::debug!(
            requested_installment = ?command.installment_amount,
            computed_installment = fees.installment_amount,
            requested_interest = ?command.interest_amount,
            computed_interest = fees.interest_amount,
            "Caller estimates differ from computed amounts"
        );
    }
}

// =========================================================================
// TransactionQueryHandler
// =========================================================================

pub struct TransactionQueryHandler {
    transactions: TransactionRepository,
}

impl TransactionQueryHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool),
        }
    }

    /// A transaction owned by another customer is reported as not found
    pub async fn detail(&self, id: i64, customer_id: i64) -> Result<TransactionRecord, AppError> {
        self.transactions
            .find_by_id_and_customer(id, customer_id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => AppError::TransactionNotFound,
                other => other.into(),
            })
    }

    pub async fn history(
        &self,
        customer_id: i64,
        request: PageRequest,
    ) -> Result<Page<TransactionRecord>, AppError> {
        Ok(self
            .transactions
            .find_by_customer_paged(customer_id, request)
            .await?)
    }
}
