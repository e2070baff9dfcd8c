//! Customer Handlers
//!
//! Registration (customer row plus seeded credit limits in one database
//! transaction) and the customer-scoped read models.

use sqlx::PgPool;

use crate::auth::hash_password;
use crate::domain::{OperationContext, SalaryTier};
use crate::error::AppError;
use crate::repository::{
    CreditLimit, CreditLimitRepository, Customer, CustomerRepository, NewCustomer, StorageError,
    EMAIL_UNIQUE_CONSTRAINT, NIK_UNIQUE_CONSTRAINT,
};

use super::{RegisterCustomerCommand, RegisterCustomerResult};

// =========================================================================
// RegisterCustomerHandler
// =========================================================================

pub struct RegisterCustomerHandler {
    pool: PgPool,
    customers: CustomerRepository,
    credit_limits: CreditLimitRepository,
}

impl RegisterCustomerHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool.clone()),
            credit_limits: CreditLimitRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn execute(
        &self,
        command: RegisterCustomerCommand,
        context: &OperationContext,
    ) -> Result<RegisterCustomerResult, AppError> {
        let (birth_date, salary) = command.validate()?;
        let tier = SalaryTier::for_salary(salary.value());

        let password = command.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task: {}", e)))?
            .map_err(|e| AppError::Internal(format!("password hashing: {}", e)))?;

        let customer = NewCustomer {
            nik: command.nik,
            email: command.email,
            password_hash,
            full_name: command.full_name,
            legal_name: command.legal_name,
            birth_place: command.birth_place,
            birth_date,
            salary: salary.to_decimal(),
            ktp_photo_path: command.ktp_photo_path,
            selfie_photo_path: command.selfie_photo_path,
        };

        let mut tx = self.pool.begin().await?;

        let id = match self.customers.insert(&mut tx, &customer).await {
            Ok(id) => id,
            Err(err) => {
                rollback_quietly(tx).await;
                return Err(map_registration_error(err));
            }
        };

        for limit in tier.default_limits() {
            if let Err(err) = self
                .credit_limits
                .insert(&mut tx, id, limit.tenor_month, limit.limit_amount)
                .await
            {
                rollback_quietly(tx).await;
                return Err(err.into());
            }
        }

        tx.commit().await?;

        tracing::info!(
            customer_id = id,
            tier = ?tier,
            correlation_id = ?context.correlation_id,
            "Customer registered"
        );

        Ok(RegisterCustomerResult {
            id,
            email: customer.email,
        })
    }
}

fn map_registration_error(err: StorageError) -> AppError {
    if err.is_unique_violation_on(NIK_UNIQUE_CONSTRAINT) {
        AppError::NikAlreadyRegistered
    } else if err.is_unique_violation_on(EMAIL_UNIQUE_CONSTRAINT) {
        AppError::EmailAlreadyRegistered
    } else {
        AppError::Storage(err)
    }
}

async fn rollback_quietly(tx: sqlx::Transaction<'_, sqlx::Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::error!(error = %e, "Registration rollback failed");
    }
}

// =========================================================================
// CustomerQueryHandler
// =========================================================================

/// Profile with the customer's limits attached
#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub customer: Customer,
    pub limits: Vec<CreditLimit>,
}

pub struct CustomerQueryHandler {
    customers: CustomerRepository,
    credit_limits: CreditLimitRepository,
}

impl CustomerQueryHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool.clone()),
            credit_limits: CreditLimitRepository::new(pool),
        }
    }

    pub async fn profile(&self, customer_id: i64) -> Result<CustomerProfile, AppError> {
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => AppError::CustomerNotFound,
                other => other.into(),
            })?;
        let limits = self.credit_limits.find_by_customer(customer_id).await?;

        Ok(CustomerProfile { customer, limits })
    }

    pub async fn credit_limits(&self, customer_id: i64) -> Result<Vec<CreditLimit>, AppError> {
        Ok(self.credit_limits.find_by_customer(customer_id).await?)
    }
}
