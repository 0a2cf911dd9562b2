//! Showing Workflow Tests

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::common::{read_json, unique_email, TestApp};

async fn create_listing(app: &TestApp, agent_token: &str) -> String {
    let body = json!({
        "title": "Showable House",
        "description": "Three bedrooms, close to schools.",
        "property_type": "house",
        "price_cents": 80_000_000,
        "address": "4 Elm Drive",
        "city": "Springfield",
        "bedrooms": 3,
        "bathrooms": 2,
        "area_sqm": 120,
    });
    let response = app.post_json_auth("/api/v1/listings", &body, agent_token).await;
    assert_eq!(response.status(), 201);
    read_json(response).await["id"].as_str().unwrap().to_string()
}

fn showing_body(listing_id: &str) -> Value {
    let start = Utc::now() + Duration::hours(24);
    let end = start + Duration::hours(1);
    json!({
        "listing_id": listing_id,
        "scheduled_start": start.to_rfc3339(),
        "scheduled_end": end.to_rfc3339(),
        "note": "After work if possible",
    })
}

#[tokio::test]
async fn test_request_accept_complete_flow() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let listing_id = create_listing(&app, &agent).await;

    let response = app
        .post_json_auth("/api/v1/showings", &showing_body(&listing_id), &buyer)
        .await;
    assert_eq!(response.status(), 201);
    let showing = read_json(response).await;
    assert_eq!(showing["status"], "pending");
    let id = showing["id"].as_str().unwrap().to_string();

    let response = app
        .post_auth(&format!("/api/v1/showings/{}/accept", id), &agent)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(read_json(response).await["status"], "accepted");

    let response = app
        .post_auth(&format!("/api/v1/showings/{}/complete", id), &agent)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(read_json(response).await["status"], "completed");
}

#[tokio::test]
async fn test_decline_records_reason_and_blocks_reaccept() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let listing_id = create_listing(&app, &agent).await;

    let response = app
        .post_json_auth("/api/v1/showings", &showing_body(&listing_id), &buyer)
        .await;
    let id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .post_json_auth(
            &format!("/api/v1/showings/{}/decline", id),
            &json!({ "reason": "Already under offer" }),
            &agent,
        )
        .await;
    assert_eq!(response.status(), 200);
    let declined = read_json(response).await;
    assert_eq!(declined["status"], "declined");
    assert_eq!(declined["decline_reason"], "Already under offer");

    // Declined is terminal
    let response = app
        .post_auth(&format!("/api/v1/showings/{}/accept", id), &agent)
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_buyer_cannot_accept_own_request() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let listing_id = create_listing(&app, &agent).await;

    let response = app
        .post_json_auth("/api/v1/showings", &showing_body(&listing_id), &buyer)
        .await;
    let id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .post_auth(&format!("/api/v1/showings/{}/accept", id), &buyer)
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_past_window_rejected() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let listing_id = create_listing(&app, &agent).await;

    let start = Utc::now() - Duration::hours(2);
    let body = json!({
        "listing_id": listing_id,
        "scheduled_start": start.to_rfc3339(),
        "scheduled_end": (start + Duration::hours(1)).to_rfc3339(),
    });

    let response = app.post_json_auth("/api/v1/showings", &body, &buyer).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_request_notifies_agent() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let listing_id = create_listing(&app, &agent).await;

    app.post_json_auth("/api/v1/showings", &showing_body(&listing_id), &buyer)
        .await;

    let response = app.get_auth("/api/v1/notifications", &agent).await;
    assert_eq!(response.status(), 200);
    let notifications = read_json(response).await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["kind"] == "showing_requested" && n["read"] == false));

    let response = app.get_auth("/api/v1/notifications/unread", &agent).await;
    let count = read_json(response).await;
    assert!(count["unread"].as_i64().unwrap() >= 1);
}

#[tokio::test]
async fn test_either_side_can_cancel_accepted_showing() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let listing_id = create_listing(&app, &agent).await;

    let response = app
        .post_json_auth("/api/v1/showings", &showing_body(&listing_id), &buyer)
        .await;
    let id = read_json(response).await["id"].as_str().unwrap().to_string();

    app.post_auth(&format!("/api/v1/showings/{}/accept", id), &agent)
        .await;

    let response = app
        .post_auth(&format!("/api/v1/showings/{}/cancel", id), &buyer)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(read_json(response).await["status"], "cancelled");
}
