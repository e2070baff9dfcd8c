//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::parse_bearer;
use crate::domain::{page::DEFAULT_PAGE_SIZE, Amount, OperationContext, PageMeta, PageRequest};
use crate::error::AppError;
use crate::handlers::{
    AuthHandler, CreateTransactionCommand, CreateTransactionHandler, CustomerQueryHandler,
    LoginCommand, RegisterCustomerCommand, RegisterCustomerHandler, TransactionQueryHandler,
};
use crate::repository::{CreditLimit, TransactionRecord};

use super::middleware::AuthenticatedCustomer;
use super::AppState;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// =========================================================================
// Request/Response types
// =========================================================================

pub type RegisterRequest = RegisterCustomerCommand;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreditLimitResponse {
    pub tenor: i32,
    pub limit_amount: Decimal,
}

impl From<CreditLimit> for CreditLimitResponse {
    fn from(limit: CreditLimit) -> Self {
        Self {
            tenor: limit.tenor_month,
            limit_amount: limit.limit_amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerProfileResponse {
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
    pub limits: Vec<CreditLimitResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub on_the_road_price: i64,
    pub tenor_month: i32,
    pub asset_name: String,
    #[serde(default)]
    pub installment_amount: Option<i64>,
    #[serde(default)]
    pub interest_amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    pub id: i64,
    pub contract_number: String,
    pub on_the_road_price: Decimal,
    pub admin_fee: Decimal,
    pub installment_amount: Decimal,
    pub interest_amount: Decimal,
    pub asset_name: String,
    pub replayed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
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

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            customer_id: record.customer_id,
            contract_number: record.contract_number,
            on_the_road_price: record.on_the_road_price,
            admin_fee: record.admin_fee,
            installment_amount: record.installment_amount,
            interest_amount: record.interest_amount,
            asset_name: record.asset_name,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub paginate: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub items: Vec<TransactionResponse>,
    pub meta: PageMeta,
}

// =========================================================================
// API Routers
// =========================================================================

/// Routes reachable without a session
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
}

/// Routes that require a bearer access token
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/customer/profile", get(get_profile))
        .route("/credit/limits", get(get_credit_limits))
        .route("/transactions", post(create_transaction).get(get_history))
        .route("/transactions/:id", get(get_transaction))
}

// =========================================================================
// Auth
// =========================================================================

async fn register(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let handler = RegisterCustomerHandler::new(state.pool);
    let result = handler.execute(request, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: result.id,
            email: result.email,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    let handler = AuthHandler::new(state.pool, state.session_ttl);
    let result = handler
        .login(LoginCommand::new(request.email, request.password), &context)
        .await?;

    Ok(Json(LoginResponse {
        id: result.id,
        email: result.email,
        full_name: result.full_name,
        token: result.token,
        refresh_token: result.refresh_token,
    }))
}

/// The refresh token is presented as the bearer credential
async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshTokenResponse>, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
        .ok_or(AppError::Unauthorized)?;

    let handler = AuthHandler::new(state.pool, state.session_ttl);
    let result = handler.refresh(token).await?;

    Ok(Json(RefreshTokenResponse {
        token: result.token,
    }))
}

async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> Result<StatusCode, AppError> {
    let handler = AuthHandler::new(state.pool, state.session_ttl);
    handler.logout(&context).await?;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Customer
// =========================================================================

async fn get_profile(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthenticatedCustomer>,
) -> Result<Json<CustomerProfileResponse>, AppError> {
    let handler = CustomerQueryHandler::new(state.pool);
    let profile = handler.profile(customer.customer_id).await?;
    let c = profile.customer;

    Ok(Json(CustomerProfileResponse {
        id: c.id,
        nik: c.nik,
        email: c.email,
        full_name: c.full_name,
        legal_name: c.legal_name,
        birth_place: c.birth_place,
        birth_date: c.birth_date,
        salary: c.salary,
        ktp_photo_path: c.ktp_photo_path,
        selfie_photo_path: c.selfie_photo_path,
        limits: profile.limits.into_iter().map(Into::into).collect(),
        created_at: c.created_at,
        updated_at: c.updated_at,
    }))
}

async fn get_credit_limits(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthenticatedCustomer>,
) -> Result<Json<Vec<CreditLimitResponse>>, AppError> {
    let handler = CustomerQueryHandler::new(state.pool);
    let limits = handler.credit_limits(customer.customer_id).await?;

    Ok(Json(limits.into_iter().map(Into::into).collect()))
}

// =========================================================================
// Transactions
// =========================================================================

fn idempotency_key(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::InvalidRequest("Idempotency-Key must be a UUID".to_string()))
}

async fn create_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    headers: HeaderMap,
    WithRejection(Json(request), _): WithRejection<Json<CreateTransactionRequest>, AppError>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), AppError> {
    let price = Amount::new(request.on_the_road_price)
        .map_err(|e| AppError::InvalidRequest(format!("on_the_road_price: {}", e)))?;

    let mut command = CreateTransactionCommand::new(price, request.tenor_month, request.asset_name);
    command.installment_amount = request.installment_amount;
    command.interest_amount = request.interest_amount;
    if let Some(key) = idempotency_key(&headers)? {
        command = command.with_idempotency_key(key);
    }

    let handler = CreateTransactionHandler::new(state.pool, state.idempotency_key_ttl);
    let result = handler.execute(command, &context).await?;

    let status = if result.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(CreateTransactionResponse {
            id: result.id,
            contract_number: result.contract_number,
            on_the_road_price: result.on_the_road_price,
            admin_fee: result.admin_fee,
            installment_amount: result.installment_amount,
            interest_amount: result.interest_amount,
            asset_name: result.asset_name,
            replayed: result.replayed,
        }),
    ))
}

async fn get_transaction(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<TransactionResponse>, AppError> {
    let handler = TransactionQueryHandler::new(state.pool);
    let record = handler.detail(id, customer.customer_id).await?;

    Ok(Json(record.into()))
}

async fn get_history(
    State(state): State<AppState>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, AppError>,
) -> Result<Json<HistoryResponse>, AppError> {
    let request = PageRequest::new(
        query.page.unwrap_or(1),
        query.paginate.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    let handler = TransactionQueryHandler::new(state.pool);
    let page = handler
        .history(customer.customer_id, request)
        .await?
        .map(TransactionResponse::from);

    Ok(Json(HistoryResponse {
        items: page.items,
        meta: page.meta,
    }))
}
