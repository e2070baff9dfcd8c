//! Common test utilities
//!
//! Tests share one database and run in parallel, so nothing is truncated:
//! every test registers its own customers with unique NIK and email.

#![allow(dead_code)]

use multifinance::handlers::{RegisterCustomerCommand, RegisterCustomerHandler};
use multifinance::{db, OperationContext};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub const TEST_PASSWORD: &str = "Password123";

/// Connect and apply the schema
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    db::apply_schema(&pool).await.expect("Failed to apply schema");

    pool
}

/// Random 16-digit NIK
pub fn unique_nik() -> String {
    let n: u64 = rand::thread_rng().gen_range(1_000_000_000_000_000..10_000_000_000_000_000);
    n.to_string()
}

pub fn unique_email() -> String {
    format!("{}@example.com", uuid::Uuid::new_v4().simple())
}

pub fn register_command(salary: i64) -> RegisterCustomerCommand {
    RegisterCustomerCommand {
        nik: unique_nik(),
        email: unique_email(),
        password: TEST_PASSWORD.to_string(),
        full_name: "Budi Santoso".to_string(),
        legal_name: "Budi Santoso".to_string(),
        birth_place: "Bandung".to_string(),
        birth_date: "1990-05-17".to_string(),
        salary,
        ktp_photo_path: "uploads/ktp/budi.jpg".to_string(),
        selfie_photo_path: "uploads/selfie/budi.png".to_string(),
    }
}

/// Register a fresh customer and return its id
pub async fn register_customer(pool: &PgPool, salary: i64) -> i64 {
    RegisterCustomerHandler::new(pool.clone())
        .execute(register_command(salary), &OperationContext::new())
        .await
        .expect("Failed to register customer")
        .id
}

pub fn context_for(customer_id: i64) -> OperationContext {
    OperationContext::new().with_customer(customer_id)
}

pub async fn count_transactions(pool: &PgPool, customer_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count transactions")
}
