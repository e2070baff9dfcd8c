//! Auth Handler
//!
//! Login, token refresh, logout and bearer-token resolution.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::auth::{generate_token, hash_token, verify_password, TokenType};
use crate::domain::OperationContext;
use crate::error::AppError;
use crate::repository::{CustomerRepository, SessionRepository};

use super::{LoginCommand, LoginResult, RefreshTokenResult};

/// Session lifetimes applied when issuing tokens
#[derive(Debug, Clone, Copy)]
pub struct SessionTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for SessionTtl {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::minutes(4320),
        }
    }
}

pub struct AuthHandler {
    customers: CustomerRepository,
    sessions: SessionRepository,
    ttl: SessionTtl,
}

impl AuthHandler {
    pub fn new(pool: PgPool, ttl: SessionTtl) -> Self {
        Self {
            customers: CustomerRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
            ttl,
        }
    }

    pub async fn login(
        &self,
        command: LoginCommand,
        context: &OperationContext,
    ) -> Result<LoginResult, AppError> {
        command.validate()?;

        let credentials = self
            .customers
            .find_credentials_by_email(&command.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = command.password;
        let stored = credentials.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task: {}", e)))?;

        if !matches {
            tracing::warn!(
                customer_id = credentials.id,
                correlation_id = ?context.correlation_id,
                client_ip = ?context.client_ip,
                "Login rejected: wrong password"
            );
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue(credentials.id, TokenType::Access).await?;
        let refresh_token = self.issue(credentials.id, TokenType::Refresh).await?;

        tracing::info!(customer_id = credentials.id, "Customer logged in");

        Ok(LoginResult {
            id: credentials.id,
            email: credentials.email,
            full_name: credentials.full_name,
            token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResult, AppError> {
        let customer_id = self
            .sessions
            .find_active_customer(&hash_token(refresh_token), TokenType::Refresh)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let token = self.issue(customer_id, TokenType::Access).await?;

        Ok(RefreshTokenResult { token })
    }

    /// Revoke every access session of the customer
    pub async fn logout(&self, context: &OperationContext) -> Result<(), AppError> {
        let customer_id = context.customer_id.ok_or(AppError::Unauthorized)?;

        let revoked = self
            .sessions
            .revoke_all(customer_id, TokenType::Access)
            .await?;

        tracing::info!(customer_id, revoked, "Customer logged out");
        Ok(())
    }

    /// Resolve a bearer access token to its customer
    pub async fn authenticate(&self, access_token: &str) -> Result<i64, AppError> {
        self.sessions
            .find_active_customer(&hash_token(access_token), TokenType::Access)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    async fn issue(&self, customer_id: i64, token_type: TokenType) -> Result<String, AppError> {
        let ttl = match token_type {
            TokenType::Access => self.ttl.access,
            TokenType::Refresh => self.ttl.refresh,
        };
        let token = generate_token();

        self.sessions
            .insert(&hash_token(&token), customer_id, token_type, Utc::now() + ttl)
            .await?;

        Ok(token)
    }
}
