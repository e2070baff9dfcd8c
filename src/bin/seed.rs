//! Demo data seeder
//!
//! Registers N demo customers through the normal registration path, so each
//! one gets its salary-tier credit limits.
//!
//! Run with: cargo run --bin seed -- --total 10 --salary 4000000

use multifinance::handlers::{RegisterCustomerCommand, RegisterCustomerHandler};
use multifinance::{connect_pool, db, init_tracing, AppError, Config, OperationContext};

mod common;

use common::arg;

const DEFAULT_PASSWORD: &str = "Password123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let args: Vec<String> = std::env::args().collect();
    let total: u32 = arg(&args, "--total", 1);
    let salary: i64 = arg(&args, "--salary", 5_000_000);

    let pool = connect_pool(&config).await?;
    db::apply_schema(&pool).await?;

    let handler = RegisterCustomerHandler::new(pool.clone());
    let context = OperationContext::new();
    let (mut created, mut skipped) = (0u32, 0u32);

    for n in 1..=total {
        let command = RegisterCustomerCommand {
            nik: format!("{:016}", n),
            email: format!("user{}@example.com", n),
            password: DEFAULT_PASSWORD.to_string(),
            full_name: format!("User {}", n),
            legal_name: format!("User Legal {}", n),
            birth_place: "Jakarta".to_string(),
            birth_date: "1990-01-01".to_string(),
            salary,
            ktp_photo_path: format!("uploads/ktp/user{}.jpg", n),
            selfie_photo_path: format!("uploads/selfie/user{}.jpg", n),
        };

        match handler.execute(command, &context).await {
            Ok(result) => {
                created += 1;
                tracing::info!(customer_id = result.id, email = %result.email, "Seeded customer");
            }
            Err(AppError::NikAlreadyRegistered | AppError::EmailAlreadyRegistered) => {
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(created, skipped, "Seeding finished");
    pool.close().await;

    Ok(())
}
