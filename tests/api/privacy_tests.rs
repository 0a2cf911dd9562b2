//! Privacy Settings and Legal Document Tests

use serde_json::json;

use crate::common::{read_json, unique_email, TestApp};

#[tokio::test]
async fn test_privacy_defaults_hide_contact_details() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, token) = app.register("seller", &unique_email()).await;

    let response = app.get_auth("/api/v1/privacy", &token).await;
    assert_eq!(response.status(), 200);

    let settings = read_json(response).await;
    assert_eq!(settings["show_email"], false);
    assert_eq!(settings["show_phone"], false);
    assert_eq!(settings["marketing_emails"], true);
}

#[tokio::test]
async fn test_partial_privacy_update() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (_, token) = app.register("buyer", &unique_email()).await;

    let response = app
        .patch_json_auth("/api/v1/privacy", &json!({ "show_email": true }), &token)
        .await;
    assert_eq!(response.status(), 200);

    let settings = read_json(response).await;
    assert_eq!(settings["show_email"], true);
    // Untouched fields keep their defaults
    assert_eq!(settings["show_phone"], false);
    assert_eq!(settings["marketing_emails"], true);
}

#[tokio::test]
async fn test_legal_documents_are_public() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app.get("/api/v1/legal/privacy-policy").await;
    assert_eq!(response.status(), 200);

    let document = read_json(response).await;
    assert_eq!(document["slug"], "privacy-policy");
    assert!(document["title"].is_string());
    assert!(document["version"].as_i64().unwrap() >= 1);

    let response = app.get("/api/v1/legal/no-such-document").await;
    assert_eq!(response.status(), 404);
}
