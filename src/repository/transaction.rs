//! Transaction Repository
//!
//! Append-only store of completed installment transactions. Reads are
//! always scoped to the owning customer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{contract_number, Amount, FeeBreakdown, Page, PageMeta, PageRequest};

use super::StorageError;

/// Stored transaction row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub customer_id: i64,
    pub contract_number: String,
    pub on_the_road_price: Decimal,
    pub admin_fee: Decimal,
    pub installment_amount: Decimal,
    pub interest_amount: Decimal,
    pub asset_name: String,
    pub created_at: DateTime<Utc>,
}

/// Row to insert; `id` is assigned by the database. The contract number
/// carries the UTC date of `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub customer_id: i64,
    pub contract_number: String,
    pub on_the_road_price: Decimal,
    pub admin_fee: Decimal,
    pub installment_amount: Decimal,
    pub interest_amount: Decimal,
    pub asset_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn new(
        customer_id: i64,
        price: Amount,
        fees: FeeBreakdown,
        asset_name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id,
            contract_number: contract_number(customer_id, created_at.date_naive()),
            on_the_road_price: price.to_decimal(),
            admin_fee: Decimal::from(fees.admin_fee),
            installment_amount: Decimal::from(fees.installment_amount),
            interest_amount: Decimal::from(fees.interest_amount),
            asset_name,
            created_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    id, customer_id, contract_number, on_the_road_price, admin_fee,
    installment_amount, interest_amount, asset_name, created_at
"#;

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one row inside the caller's transaction and return it as stored
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, StorageError> {
        let query = format!(
            r#"
            INSERT INTO transactions (
                customer_id, contract_number, on_the_road_price, admin_fee,
                installment_amount, interest_amount, asset_name, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let record = sqlx::query_as::<_, TransactionRecord>(&query)
            .bind(transaction.customer_id)
            .bind(&transaction.contract_number)
            .bind(transaction.on_the_road_price)
            .bind(transaction.admin_fee)
            .bind(transaction.installment_amount)
            .bind(transaction.interest_amount)
            .bind(&transaction.asset_name)
            .bind(transaction.created_at)
            .fetch_one(&mut **tx)
            .await?;

        Ok(record)
    }

    /// Lookup within an open transaction, used when replaying an
    /// idempotent request.
    pub async fn find_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        customer_id: i64,
    ) -> Result<TransactionRecord, StorageError> {
        let query = format!(
            "SELECT {} FROM transactions WHERE id = $1 AND customer_id = $2",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, TransactionRecord>(&query)
            .bind(id)
            .bind(customer_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Point lookup scoped to the owner. A row that exists under another
    /// customer is reported as `NotFound`.
    pub async fn find_by_id_and_customer(
        &self,
        id: i64,
        customer_id: i64,
    ) -> Result<TransactionRecord, StorageError> {
        let query = format!(
            "SELECT {} FROM transactions WHERE id = $1 AND customer_id = $2",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, TransactionRecord>(&query)
            .bind(id)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// One page of a customer's history, newest first, with the total count
    pub async fn find_by_customer_paged(
        &self,
        customer_id: i64,
        request: PageRequest,
    ) -> Result<Page<TransactionRecord>, StorageError> {
        let total_data: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        let query = format!(
            r#"
            SELECT {}
            FROM transactions
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            SELECT_COLUMNS
        );

        let items = sqlx::query_as::<_, TransactionRecord>(&query)
            .bind(customer_id)
            .bind(request.paginate())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            meta: PageMeta::new(request, total_data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_from_fees() {
        let price = Amount::new(500_000).unwrap();
        let fees = FeeBreakdown::compute(500_000, 12);

        let created_at = "2024-01-01T03:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let row = NewTransaction::new(7, price, fees, "Yamaha NMAX".to_string(), created_at);

        assert_eq!(row.contract_number, "TRX202401010007");
        assert_eq!(row.on_the_road_price, Decimal::from(500_000));
        assert_eq!(row.admin_fee, Decimal::from(50_000));
        assert_eq!(row.interest_amount, Decimal::from(60_000));
        assert_eq!(row.installment_amount, Decimal::from(46_666));
    }

    #[test]
    fn test_contract_date_is_utc_date_of_created_at() {
        let price = Amount::new(100_000).unwrap();
        let fees = FeeBreakdown::compute(100_000, 1);

        // 23:30 UTC is already the next day in UTC+7; the contract follows UTC
        let created_at = "2024-12-31T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let row = NewTransaction::new(42, price, fees, "Phone".to_string(), created_at);

        assert_eq!(row.contract_number, "TRX202412310042");
    }
}
