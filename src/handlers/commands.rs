//! Command definitions
//!
//! Commands represent intentions to change the system state. Each command
//! validates its own shape before a handler touches the database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validation::{
    parse_birth_date, validate_email, validate_nik, validate_password, validate_photo_path,
    validate_text,
};
use crate::domain::{Amount, DomainError, MAX_TENOR_MONTHS};
use crate::repository::TransactionRecord;

// =========================================================================
// RegisterCustomerCommand
// =========================================================================

/// Command to onboard a new customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCustomerCommand {
    pub nik: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub legal_name: String,
    pub birth_place: String,
    pub birth_date: String,
    pub salary: i64,
    pub ktp_photo_path: String,
    pub selfie_photo_path: String,
}

impl RegisterCustomerCommand {
    /// Validate every field; returns the parsed birth date and salary.
    pub fn validate(&self) -> Result<(NaiveDate, Amount), DomainError> {
        validate_nik(&self.nik)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_text("full_name", &self.full_name)?;
        validate_text("legal_name", &self.legal_name)?;
        validate_text("birth_place", &self.birth_place)?;
        let birth_date = parse_birth_date(&self.birth_date)?;
        let salary = Amount::new(self.salary)
            .map_err(|e| DomainError::validation("salary", e.to_string()))?;
        validate_photo_path("ktp_photo_path", &self.ktp_photo_path)?;
        validate_photo_path("selfie_photo_path", &self.selfie_photo_path)?;

        Ok((birth_date, salary))
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCustomerResult {
    pub id: i64,
    pub email: String,
}

// =========================================================================
// LoginCommand
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::validation("password", "is required"));
        }
        Ok(())
    }
}

/// Issued session pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResult {
    pub token: String,
}

// =========================================================================
// CreateTransactionCommand
// =========================================================================

/// Command to finance one purchase against the customer's credit limit.
///
/// `installment_amount` and `interest_amount` are caller estimates. They
/// must be positive when present but the server computes its own figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionCommand {
    pub on_the_road_price: Amount,
    pub tenor_month: i32,
    pub asset_name: String,
    pub installment_amount: Option<i64>,
    pub interest_amount: Option<i64>,
    #[serde(skip)]
    pub idempotency_key: Option<Uuid>,
}

impl CreateTransactionCommand {
    pub fn new(on_the_road_price: Amount, tenor_month: i32, asset_name: String) -> Self {
        Self {
            on_the_road_price,
            tenor_month,
            asset_name,
            installment_amount: None,
            interest_amount: None,
            idempotency_key: None,
        }
    }

    pub fn with_hints(mut self, installment_amount: i64, interest_amount: i64) -> Self {
        self.installment_amount = Some(installment_amount);
        self.interest_amount = Some(interest_amount);
        self
    }

    pub fn with_idempotency_key(mut self, key: Uuid) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.tenor_month <= 0 || self.tenor_month > MAX_TENOR_MONTHS {
            return Err(DomainError::InvalidTenor(self.tenor_month));
        }
        validate_text("asset_name", &self.asset_name)?;
        if matches!(self.installment_amount, Some(v) if v <= 0) {
            return Err(DomainError::validation("installment_amount", "must be positive"));
        }
        if matches!(self.interest_amount, Some(v) if v <= 0) {
            return Err(DomainError::validation("interest_amount", "must be positive"));
        }
        Ok(())
    }

    /// Stable digest of the fields that define the request, used to
    /// recognise a retried request under the same idempotency key.
    pub fn request_hash(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}",
            self.on_the_road_price,
            self.tenor_month,
            self.asset_name,
            self.installment_amount.unwrap_or_default(),
            self.interest_amount.unwrap_or_default(),
        );
        crate::idempotency::IdempotencyRepository::compute_request_hash(canonical.as_bytes())
    }
}

/// Created (or replayed) transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionResult {
    pub id: i64,
    pub customer_id: i64,
    pub contract_number: String,
    pub on_the_road_price: Decimal,
    pub admin_fee: Decimal,
    pub installment_amount: Decimal,
    pub interest_amount: Decimal,
    pub asset_name: String,
    /// `true` when an earlier request with the same idempotency key
    /// produced this transaction
    pub replayed: bool,
}

impl CreateTransactionResult {
    pub fn from_record(record: TransactionRecord, replayed: bool) -> Self {
        Self {
            id: record.id,
            customer_id: record.customer_id,
            contract_number: record.contract_number,
            on_the_road_price: record.on_the_road_price,
            admin_fee: record.admin_fee,
            installment_amount: record.installment_amount,
            interest_amount: record.interest_amount,
            asset_name: record.asset_name,
            replayed,
        }
    }
}
