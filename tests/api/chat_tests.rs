//! Conversation and Message API Tests

use serde_json::json;

use crate::common::{read_json, unique_email, TestApp};

async fn open_conversation(app: &TestApp, token: &str, other_role: &str, other_id: &str) -> String {
    let body = json!({ "other_role": other_role, "other_id": other_id });
    let response = app.post_json_auth("/api/v1/conversations", &body, token).await;
    assert_eq!(response.status(), 201);
    read_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_open_conversation_is_idempotent() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, _) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let first = open_conversation(&app, &buyer, "agent", &agent_id).await;
    let second = open_conversation(&app, &buyer, "agent", &agent_id).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_opens_converge_on_one_conversation() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, _) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let body = json!({ "other_role": "agent", "other_id": agent_id });
    let (first, second) = tokio::join!(
        app.post_json_auth("/api/v1/conversations", &body, &buyer),
        app.post_json_auth("/api/v1/conversations", &body, &buyer),
    );
    assert_eq!(first.status(), 201);
    assert_eq!(second.status(), 201);

    let first = read_json(first).await;
    let second = read_json(second).await;
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_conversation_requires_exactly_one_agent() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (seller_id, _) = app.register("seller", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let body = json!({ "other_role": "seller", "other_id": seller_id });
    let response = app.post_json_auth("/api/v1/conversations", &body, &buyer).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_send_message_and_unread_counters() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let conversation_id = open_conversation(&app, &buyer, "agent", &agent_id).await;

    let response = app
        .post_json_auth(
            &format!("/api/v1/conversations/{}/messages", conversation_id),
            &json!({ "content": "Is the house still available?" }),
            &buyer,
        )
        .await;
    assert_eq!(response.status(), 201);
    let message = read_json(response).await;
    assert_eq!(message["sender_role"], "buyer");
    assert_eq!(message["content"], "Is the house still available?");

    // The agent sees one unread; the sender sees none
    let response = app
        .get_auth(&format!("/api/v1/conversations/{}", conversation_id), &agent)
        .await;
    assert_eq!(read_json(response).await["unread"], 1);

    let response = app
        .get_auth(&format!("/api/v1/conversations/{}", conversation_id), &buyer)
        .await;
    assert_eq!(read_json(response).await["unread"], 0);
}

#[tokio::test]
async fn test_history_returns_messages_and_clears_unread() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let conversation_id = open_conversation(&app, &buyer, "agent", &agent_id).await;
    app.post_json_auth(
        &format!("/api/v1/conversations/{}/messages", conversation_id),
        &json!({ "content": "Hello there" }),
        &buyer,
    )
    .await;

    // Reading history marks the reader caught up
    let response = app
        .get_auth(
            &format!("/api/v1/conversations/{}/messages", conversation_id),
            &agent,
        )
        .await;
    assert_eq!(response.status(), 200);
    let messages = read_json(response).await;
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["content"], "Hello there");

    let response = app
        .get_auth(&format!("/api/v1/conversations/{}", conversation_id), &agent)
        .await;
    assert_eq!(read_json(response).await["unread"], 0);
}

#[tokio::test]
async fn test_mark_read_endpoint() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, agent) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let conversation_id = open_conversation(&app, &buyer, "agent", &agent_id).await;
    app.post_json_auth(
        &format!("/api/v1/conversations/{}/messages", conversation_id),
        &json!({ "content": "ping" }),
        &buyer,
    )
    .await;

    let response = app
        .post_auth(&format!("/api/v1/conversations/{}/read", conversation_id), &agent)
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .get_auth(&format!("/api/v1/conversations/{}", conversation_id), &agent)
        .await;
    assert_eq!(read_json(response).await["unread"], 0);
}

#[tokio::test]
async fn test_outsider_cannot_read_conversation() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, _) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;
    let (_, outsider) = app.register("buyer", &unique_email()).await;

    let conversation_id = open_conversation(&app, &buyer, "agent", &agent_id).await;

    let response = app
        .get_auth(
            &format!("/api/v1/conversations/{}", conversation_id),
            &outsider,
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_conversation_list_orders_by_activity() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let (agent_id, _) = app.register("agent", &unique_email()).await;
    let (_, buyer) = app.register("buyer", &unique_email()).await;

    let conversation_id = open_conversation(&app, &buyer, "agent", &agent_id).await;
    app.post_json_auth(
        &format!("/api/v1/conversations/{}/messages", conversation_id),
        &json!({ "content": "first" }),
        &buyer,
    )
    .await;

    let response = app.get_auth("/api/v1/conversations", &buyer).await;
    assert_eq!(response.status(), 200);
    let conversations = read_json(response).await;
    let conversations = conversations.as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["id"], conversation_id.as_str());
    assert!(conversations[0]["last_message_at"].is_string());
}
