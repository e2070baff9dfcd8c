//! Customer Repository

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use super::StorageError;

/// Unique constraint names from the schema
pub const NIK_UNIQUE_CONSTRAINT: &str = "customers_nik_key";
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "customers_email_key";

/// Customer profile row (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub nik: String,
    pub email: String,
    pub full_name: String,
    pub legal_name: String,
    pub birth_place: String,
    pub birth_date: NaiveDate,
    pub salary: Decimal,
    pub ktp_photo_path: String,
    pub selfie_photo_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login lookup row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerCredentials {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub nik: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub legal_name: String,
    pub birth_place: String,
    pub birth_date: NaiveDate,
    pub salary: Decimal,
    pub ktp_photo_path: String,
    pub selfie_photo_path: String,
}

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert inside the registration transaction and return the new id.
    ///
    /// A duplicate NIK or email surfaces as `StorageError::UniqueViolation`
    /// naming `NIK_UNIQUE_CONSTRAINT` or `EMAIL_UNIQUE_CONSTRAINT`.
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: &NewCustomer,
    ) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customers (
                nik, email, password_hash, full_name, legal_name, birth_place,
                birth_date, salary, ktp_photo_path, selfie_photo_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&customer.nik)
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(&customer.full_name)
        .bind(&customer.legal_name)
        .bind(&customer.birth_place)
        .bind(customer.birth_date)
        .bind(customer.salary)
        .bind(&customer.ktp_photo_path)
        .bind(&customer.selfie_photo_path)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// `None` when no customer has this email
    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CustomerCredentials>, StorageError> {
        let credentials = sqlx::query_as::<_, CustomerCredentials>(
            "SELECT id, email, full_name, password_hash FROM customers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Customer, StorageError> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, nik, email, full_name, legal_name, birth_place, birth_date,
                   salary, ktp_photo_path, selfie_photo_path, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
