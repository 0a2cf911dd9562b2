//! Listing API Tests

use serde_json::{json, Value};

use crate::common::{read_json, unique_email, TestApp};

fn listing_body(title: &str, city: &str) -> Value {
    json!({
        "title": title,
        "description": "Bright two-bedroom with a garden view.",
        "property_type": "apartment",
        "price_cents": 45_000_000,
        "address": "12 Main Street",
        "city": city,
        "bedrooms": 2,
        "bathrooms": 1,
        "area_sqm": 74,
    })
}

#[tokio::test]
async fn test_agent_creates_and_fetches_listing() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, token) = app.register("agent", &unique_email()).await;

    let response = app
        .post_json_auth("/api/v1/listings", &listing_body("Garden Flat", "Springfield"), &token)
        .await;
    assert_eq!(response.status(), 201);

    let created = read_json(response).await;
    assert_eq!(created["agent_id"], agent_id.as_str());
    assert_eq!(created["status"], "active");

    // Detail endpoint is public
    let id = created["id"].as_str().unwrap();
    let response = app.get(&format!("/api/v1/listings/{}", id)).await;
    assert_eq!(response.status(), 200);
    let fetched = read_json(response).await;
    assert_eq!(fetched["title"], "Garden Flat");
}

#[tokio::test]
async fn test_buyer_cannot_create_listing() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, token) = app.register("buyer", &unique_email()).await;

    let response = app
        .post_json_auth("/api/v1/listings", &listing_body("Nope", "Springfield"), &token)
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_search_filters_by_city() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, token) = app.register("agent", &unique_email()).await;

    // Unique city name so concurrent test data never matches
    let city = format!("City{}", uuid::Uuid::new_v4().simple());
    app.post_json_auth("/api/v1/listings", &listing_body("In Town", &city), &token)
        .await;
    app.post_json_auth(
        "/api/v1/listings",
        &listing_body("Out of Town", "Elsewhere"),
        &token,
    )
    .await;

    let response = app.get(&format!("/api/v1/listings?city={}", city)).await;
    assert_eq!(response.status(), 200);

    let listings = read_json(response).await;
    let listings = listings.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["title"], "In Town");
}

#[tokio::test]
async fn test_only_owner_updates_listing() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, owner) = app.register("agent", &unique_email()).await;
    let (_, intruder) = app.register("agent", &unique_email()).await;

    let response = app
        .post_json_auth("/api/v1/listings", &listing_body("Owned", "Springfield"), &owner)
        .await;
    let id = read_json(response).await["id"].as_str().unwrap().to_string();

    let patch = json!({ "status": "sold" });
    let response = app
        .patch_json_auth(&format!("/api/v1/listings/{}", id), &patch, &intruder)
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .patch_json_auth(&format!("/api/v1/listings/{}", id), &patch, &owner)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(read_json(response).await["status"], "sold");
}

#[tokio::test]
async fn test_my_listings_and_delete() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, token) = app.register("agent", &unique_email()).await;

    let response = app
        .post_json_auth("/api/v1/listings", &listing_body("Short Lived", "Springfield"), &token)
        .await;
    let id = read_json(response).await["id"].as_str().unwrap().to_string();

    let response = app.get_auth("/api/v1/listings/my", &token).await;
    assert_eq!(response.status(), 200);
    let mine = read_json(response).await;
    assert!(mine
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["id"] == id.as_str()));

    let response = app
        .delete_auth(&format!("/api/v1/listings/{}", id), &token)
        .await;
    assert_eq!(response.status(), 204);

    let response = app.get(&format!("/api/v1/listings/{}", id)).await;
    assert_eq!(response.status(), 404);
}
