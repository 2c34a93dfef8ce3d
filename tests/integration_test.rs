//! Black-box tests over the HTTP surface.

use axum::http::StatusCode;
use binplan::api::{self, AppState};
use binplan::config::Config;
use binplan::db::init_db;
use binplan::domain::{Decimal, MemberId};
use binplan::Repository;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        admin_member_id: MemberId::new("house"),
        max_upline_depth: 4,
        placement_max_retries: 3,
        allow_inactive_referrer: false,
        max_ledger_amount: Decimal::from_str_canonical("1000000000").unwrap(),
    };

    let state = AppState::new(repo, config);
    (api::create_router(state), temp_dir)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            axum::body::Body::from(json.to_string())
        }
        None => axum::body::Body::empty(),
    };
    let request = builder.body(body).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn seed_catalog_and_rates(app: &axum::Router) {
    let (status, _) = send(
        app,
        "POST",
        "/v1/packages",
        Some(serde_json::json!({
            "id": "basic",
            "name": "Basic",
            "price": "100",
            "pointValue": "10",
            "maxMilestone": "10000",
            "activeDays": 365
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (level, rate) in [(0, "0.05"), (1, "0.10"), (2, "0.05"), (3, "0.03"), (4, "0.02")] {
        let (status, _) = send(
            app,
            "PUT",
            &format!("/v1/rates/{}", level),
            Some(serde_json::json!({ "rate": rate })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_registration_flow_end_to_end() {
    let (app, _temp) = setup_test_app().await;
    seed_catalog_and_rates(&app).await;

    // Bootstrap the house account as a forest root, no purchase.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({ "memberId": "house" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["placement"]["memberId"], "house");
    assert!(body["placement"].get("parentId").is_none());
    assert_eq!(body["transactions"].as_array().unwrap().len(), 0);

    // A registers under house, buying the basic package.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({
            "memberId": "a",
            "referrerId": "house",
            "packageId": "basic",
            "amount": "100",
            "eventKey": "ev-a"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["placement"]["parentId"], "house");
    assert_eq!(body["placement"]["slot"], "left");
    // Spend record + house credit (house has no package, earns no level).
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["transactionType"], "REGISTRATION");
    assert_eq!(transactions[0]["walletType"], "REGISTER");
    assert_eq!(transactions[1]["transactionType"], "COMMISSION");
    assert_eq!(transactions[1]["walletType"], "COMPANY");
    assert_eq!(transactions[1]["level"], 0);

    // B registers under A: A earns the level-1 credit.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({
            "memberId": "b",
            "referrerId": "a",
            "packageId": "basic",
            "amount": "100",
            "eventKey": "ev-b"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let transactions = body["transactions"].as_array().unwrap();
    let level1 = transactions
        .iter()
        .find(|t| t["level"] == 1)
        .expect("level-1 credit present");
    assert_eq!(level1["userId"], "a");
    assert_eq!(level1["amount"], "10");
    assert_eq!(level1["walletType"], "BONUS");

    // Member detail reflects placement, package, and earnings.
    let (status, body) = send(&app, "GET", "/v1/members/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["referrerId"], "house");
    assert_eq!(body["leftChildId"], "b");
    assert_eq!(body["packageId"], "basic");
    assert_eq!(body["totalEarnings"], "10");
    assert_eq!(body["milestoneState"], "ACCUMULATING");

    // Wallet view sums the ledger: A spent 100, earned 10.
    let (status, body) = send(&app, "GET", "/v1/members/a/wallet", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["register"], "-100");
    assert_eq!(body["bonus"], "10");
    assert_eq!(body["company"], "0");

    // Ledger history and activity feed are populated.
    let (status, body) = send(&app, "GET", "/v1/members/a/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactionCount"], 2);

    let (status, body) = send(&app, "GET", "/v1/members/a/activities", None).await;
    assert_eq!(status, StatusCode::OK);
    let activities = body["activities"].as_array().unwrap();
    assert!(!activities.is_empty());
    let activity_id = activities[0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/activities/{}/seen", activity_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seen"], true);
}

#[tokio::test]
async fn test_upgrade_endpoint() {
    let (app, _temp) = setup_test_app().await;
    seed_catalog_and_rates(&app).await;

    send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({ "memberId": "house" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({
            "memberId": "a",
            "referrerId": "house",
            "packageId": "basic",
            "amount": "100",
            "eventKey": "ev-a"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/members/a/upgrade",
        Some(serde_json::json!({
            "packageId": "basic",
            "amount": "200",
            "eventKey": "ev-up"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions[0]["transactionType"], "UPGRADE");
    assert_eq!(transactions[0]["amount"], "-200");
}

#[tokio::test]
async fn test_error_statuses() {
    let (app, _temp) = setup_test_app().await;
    seed_catalog_and_rates(&app).await;

    // Unknown referrer -> 404.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({
            "memberId": "x",
            "referrerId": "ghost"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));

    // Unknown package -> 404, and the member is not placed.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({
            "memberId": "y",
            "packageId": "nope",
            "amount": "100",
            "eventKey": "ev-y"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/v1/members/y", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Partial purchase fields -> 400.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/members/register",
        Some(serde_json::json!({
            "memberId": "z",
            "packageId": "basic"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Rate outside [0, 1] -> 400.
    let (status, _) = send(
        &app,
        "PUT",
        "/v1/rates/1",
        Some(serde_json::json!({ "rate": "1.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown member views -> 404.
    let (status, _) = send(&app, "GET", "/v1/members/ghost/wallet", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/v1/members/ghost/transactions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_and_rates_listing() {
    let (app, _temp) = setup_test_app().await;
    seed_catalog_and_rates(&app).await;

    let (status, body) = send(&app, "GET", "/v1/packages", None).await;
    assert_eq!(status, StatusCode::OK);
    let packages = body.as_array().unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0]["id"], "basic");
    assert_eq!(packages[0]["maxMilestone"], "10000");

    let (status, body) = send(&app, "GET", "/v1/rates", None).await;
    assert_eq!(status, StatusCode::OK);
    let rates = body.as_array().unwrap();
    assert_eq!(rates.len(), 5);
    assert_eq!(rates[0]["level"], 0);
    assert_eq!(rates[0]["rate"], "0.05");
}
