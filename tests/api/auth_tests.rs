//! Authentication API Tests

use serde_json::json;

use crate::common::{read_json, unique_email, TestApp};

#[tokio::test]
async fn test_register_and_fetch_current_account() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let email = unique_email();
    let (id, token) = app.register("buyer", &email).await;

    let response = app.get_auth("/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), 200);

    let json = read_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["role"], "buyer");
    // The owner always sees their own contact details
    assert_eq!(json["email"], email.as_str());
}

#[tokio::test]
async fn test_agent_registration_requires_license() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let body = json!({
        "full_name": "No License",
        "email": unique_email(),
        "password": "integration-pass-1",
    });

    let response = app.post_json("/api/v1/auth/agent/register", &body).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let body = json!({
        "full_name": "Bad Email",
        "email": "not-an-email",
        "password": "integration-pass-1",
    });

    let response = app.post_json("/api/v1/auth/buyer/register", &body).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let email = unique_email();
    app.register("seller", &email).await;

    let body = json!({
        "full_name": "Second Seller",
        "email": email,
        "password": "integration-pass-1",
    });

    let response = app.post_json("/api/v1/auth/seller/register", &body).await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_same_email_allowed_across_roles() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    // The three roles are independent tables, so the same email can hold
    // a buyer account and a seller account
    let email = unique_email();
    app.register("buyer", &email).await;
    app.register("seller", &email).await;
}

#[tokio::test]
async fn test_login_and_wrong_password() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let email = unique_email();
    app.register("buyer", &email).await;

    let response = app
        .post_json(
            "/api/v1/auth/buyer/login",
            &json!({ "email": email, "password": "integration-pass-1" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let json = read_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");

    let response = app
        .post_json(
            "/api/v1/auth/buyer/login",
            &json!({ "email": email, "password": "wrong-password-1" }),
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_refresh_token_rotation() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let email = unique_email();
    let body = json!({
        "full_name": "Rotating User",
        "email": email,
        "password": "integration-pass-1",
    });
    let response = app.post_json("/api/v1/auth/buyer/register", &body).await;
    let json = read_json(response).await;
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    // First refresh succeeds and rotates the token
    let response = app
        .post_json("/api/v1/auth/refresh", &json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(response.status(), 200);
    let rotated = read_json(response).await;
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), refresh);

    // The spent token is gone
    let response = app
        .post_json("/api/v1/auth/refresh", &json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app.get("/api/v1/auth/me").await;
    assert_eq!(response.status(), 401);

    let response = app.get_auth("/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_auth_endpoints_rate_limited() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let body = json!({ "email": unique_email(), "password": "wrong-password-1" });

    let mut last_status = 0;
    for _ in 0..6 {
        last_status = app
            .post_json("/api/v1/auth/buyer/login", &body)
            .await
            .status()
            .as_u16();
    }
    assert_eq!(last_status, 429);
}
