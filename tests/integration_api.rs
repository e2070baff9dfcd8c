//! API Integration Tests
//!
//! Drive the full router (middleware included) with `oneshot` requests.
//! Require `DATABASE_URL`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use multifinance::api::{self, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

mod common;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Register and log in; returns (customer id, access token, refresh token)
async fn onboard(app: &Router, salary: i64) -> (i64, String, String) {
    let command = common::register_command(salary);

    let (status, body) = send(
        app,
        post_json("/api/v1/auth/register", None, serde_json::to_value(&command).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": command.email, "password": common::TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["id"].as_i64(), Some(id));

    (
        id,
        body["token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_health_check() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_transaction_e2e() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));
    let (customer_id, token, _) = onboard(&app, 4_000_000).await;

    // 1. Profile carries the seeded limits
    let (status, profile) = send(&app, get("/api/v1/customer/profile", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"].as_i64(), Some(customer_id));
    assert_eq!(profile["limits"].as_array().unwrap().len(), 4);

    let (status, limits) = send(&app, get("/api/v1/credit/limits", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(limits[2]["tenor"], 3);

    // 2. Create at the limit
    let (status, created) = send(
        &app,
        post_json(
            "/api/v1/transactions",
            Some(&token),
            json!({
                "on_the_road_price": 500000,
                "tenor_month": 3,
                "asset_name": "Honda Beat",
                "installment_amount": 1,
                "interest_amount": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    assert_eq!(created["replayed"], false);
    let transaction_id = created["id"].as_i64().unwrap();

    // Caller estimates are not stored
    let installment: f64 = created["installment_amount"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(installment, 171666.0);

    // 3. Over the limit
    let (status, rejected) = send(
        &app,
        post_json(
            "/api/v1/transactions",
            Some(&token),
            json!({ "on_the_road_price": 500001, "tenor_month": 3, "asset_name": "Honda Beat" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["error_code"], "price_exceeds_credit_limit");

    // 4. Unknown tenor
    let (status, rejected) = send(
        &app,
        post_json(
            "/api/v1/transactions",
            Some(&token),
            json!({ "on_the_road_price": 1000, "tenor_month": 12, "asset_name": "Honda Beat" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["error_code"], "invalid_tenor_or_credit_limit");

    // 5. Detail and history
    let (status, detail) = send(
        &app,
        get(&format!("/api/v1/transactions/{}", transaction_id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["customer_id"].as_i64(), Some(customer_id));
    assert_eq!(detail["asset_name"], "Honda Beat");

    let (status, history) = send(&app, get("/api/v1/transactions?page=1&paginate=5", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["meta"]["total_data"], 1);
    assert_eq!(history["items"][0]["id"].as_i64(), Some(transaction_id));

    let (status, _) = send(&app, get("/api/v1/transactions?page=0", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 6. Logout revokes the access token
    let (status, _) = send(&app, post_json("/api/v1/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get("/api/v1/customer/profile", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "unauthorized");
}

#[tokio::test]
async fn test_transactions_of_other_customer_are_hidden() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));
    let (_, owner_token, _) = onboard(&app, 5_000_000).await;
    let (_, stranger_token, _) = onboard(&app, 5_000_000).await;

    let (status, created) = send(
        &app,
        post_json(
            "/api/v1/transactions",
            Some(&owner_token),
            json!({ "on_the_road_price": 150000, "tenor_month": 1, "asset_name": "Phone" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        get(
            &format!("/api/v1/transactions/{}", created["id"]),
            &stranger_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "transaction_not_found");
}

#[tokio::test]
async fn test_idempotency_api() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));
    let (_, token, _) = onboard(&app, 5_000_000).await;
    let key = Uuid::new_v4().to_string();

    let request = |price: i64, key: &str| {
        let mut req = post_json(
            "/api/v1/transactions",
            Some(&token),
            json!({ "on_the_road_price": price, "tenor_month": 2, "asset_name": "Television" }),
        );
        req.headers_mut()
            .insert("Idempotency-Key", key.parse().unwrap());
        req
    };

    let (status, first) = send(&app, request(300_000, &key)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, replay) = send(&app, request(300_000, &key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["replayed"], true);
    assert_eq!(replay["id"], first["id"]);

    let (status, conflict) = send(&app, request(310_000, &key)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["error_code"], "idempotency_conflict");

    let (status, _) = send(&app, request(300_000, "not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));
    let (customer_id, _, refresh) = onboard(&app, 5_000_000).await;

    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/refresh-token", Some(&refresh), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_token = body["token"].as_str().unwrap().to_string();

    let (status, profile) = send(&app, get("/api/v1/customer/profile", &new_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"].as_i64(), Some(customer_id));

    // Refresh tokens don't open protected routes
    let (status, _) = send(&app, get("/api/v1/customer/profile", &refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json("/api/v1/auth/refresh-token", Some("garbage"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_errors() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));

    let command = common::register_command(5_000_000);
    let (status, _) = send(
        &app,
        post_json("/api/v1/auth/register", None, serde_json::to_value(&command).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut duplicate = common::register_command(5_000_000);
    duplicate.email = command.email.clone();
    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/register", None, serde_json::to_value(&duplicate).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "email_already_registered");

    let mut weak = common::register_command(5_000_000);
    weak.password = "password".to_string();
    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/register", None, serde_json::to_value(&weak).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let pool = common::setup_test_db().await;
    let app = api::build_router(AppState::with_defaults(pool));

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/transactions")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "unauthorized");
}
