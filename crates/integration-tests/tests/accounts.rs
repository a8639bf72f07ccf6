//! Integration tests for registration, activation, and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The marketplace server running (cargo run -p plateful-marketplace)
//!
//! Run with: cargo test -p plateful-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the marketplace API (configurable via environment).
fn base_url() -> String {
    std::env::var("MARKETPLACE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client with a cookie store, so the session survives across requests.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Unique per-run registration payload, so reruns don't conflict.
fn registration_payload() -> Value {
    let tag = Uuid::new_v4().simple().to_string();
    json!({
        "first_name": "Test",
        "last_name": "Customer",
        "username": format!("test-{tag}"),
        "email": format!("test-{tag}@plateful.test"),
        "password": "integration-pass-1",
    })
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn test_register_then_login_before_activation_rejected() {
    let client = client();
    let base = base_url();
    let payload = registration_payload();

    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The account exists but is inactive until the email link is followed.
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({
            "email": payload["email"],
            "password": payload["password"],
        }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let base = base_url();
    let payload = registration_payload();

    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to register twice");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn test_weak_password_rejected() {
    let mut payload = registration_payload();
    payload["password"] = json!("short");

    let resp = client()
        .post(format!("{}/auth/register", base_url()))
        .json(&payload)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn test_bogus_activation_link_rejected() {
    let resp = client()
        .get(format!("{}/auth/activate/bogus/deadbeef", base_url()))
        .send()
        .await
        .expect("Failed to request activation");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running marketplace server with seeded data"]
async fn test_profile_media_upload() {
    let client = client();
    let base = base_url();

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({
            "email": "asha@plateful.test",
            "password": "platefuldemo",
        }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::OK);

    let form = reqwest::multipart::Form::new().part(
        "profile_picture",
        reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G']).file_name("avatar.png"),
    );
    let resp = client
        .post(format!("{base}/api/account/profile/media"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to upload media");
    assert_eq!(resp.status(), StatusCode::OK);

    let profile: Value = resp.json().await.expect("Failed to parse profile");
    assert!(profile["profile_picture"].as_str().is_some());

    // A disallowed extension is rejected before anything is stored.
    let form = reqwest::multipart::Form::new().part(
        "cover_photo",
        reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec()).file_name("cover.pdf"),
    );
    let resp = client
        .post(format!("{base}/api/account/profile/media"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to upload media");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn test_account_routes_require_login() {
    let resp = client()
        .get(format!("{}/api/account/me", base_url()))
        .send()
        .await
        .expect("Failed to request account");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
