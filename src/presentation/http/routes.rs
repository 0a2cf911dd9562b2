//! Route Definitions
//!
//! Wires handlers, middleware and layers into the application router.
//! Protected groups run the auth middleware before the rate limiter so
//! limits key on the account rather than the client IP.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::presentation::http::handlers::{
    auth, chat, health, listing, notification, password_reset, privacy, showing,
};
use crate::presentation::middleware::{
    auth::auth_middleware,
    cors::create_cors_layer,
    metrics::track_metrics,
    rate_limit::{rate_limit_api, rate_limit_auth, rate_limit_websocket},
    security::create_security_headers_layer,
};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Build the application router.
pub fn create_routes(state: AppState) -> Router {
    // Login, registration and password reset: no auth, strict limits
    let auth_routes = Router::new()
        .route("/auth/{role}/register", post(auth::register))
        .route("/auth/{role}/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/{role}/password/request", post(password_reset::request_code))
        .route("/auth/{role}/password/verify", post(password_reset::verify_code))
        .route("/auth/{role}/password/reset", post(password_reset::reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth,
        ));

    // Public browsing endpoints
    let public_routes = Router::new()
        .route("/listings", get(listing::search))
        .route("/listings/{id}", get(listing::get))
        .route("/legal/{slug}", get(privacy::get_document))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_api));

    // Everything behind authentication
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/listings", post(listing::create))
        .route("/listings/my", get(listing::my_listings))
        .route("/listings/{id}", patch(listing::update))
        .route("/listings/{id}", delete(listing::delete))
        .route("/listings/{id}/showings", get(showing::for_listing))
        .route("/showings", post(showing::request))
        .route("/showings", get(showing::list))
        .route("/showings/{id}", get(showing::get))
        .route("/showings/{id}/accept", post(showing::accept))
        .route("/showings/{id}/decline", post(showing::decline))
        .route("/showings/{id}/cancel", post(showing::cancel))
        .route("/showings/{id}/complete", post(showing::complete))
        .route("/conversations", post(chat::open))
        .route("/conversations", get(chat::list))
        .route("/conversations/{id}", get(chat::get))
        .route("/conversations/{id}/messages", get(chat::history))
        .route("/conversations/{id}/messages", post(chat::send))
        .route("/conversations/{id}/read", post(chat::mark_read))
        .route("/notifications", get(notification::list))
        .route("/notifications/unread", get(notification::unread_count))
        .route("/notifications/{id}/read", post(notification::mark_read))
        .route("/notifications/read_all", post(notification::mark_all_read))
        .route("/privacy", get(privacy::get_settings))
        .route("/privacy", patch(privacy::update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_api))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(protected_routes);

    // WebSocket authenticates via query token inside the handler
    let ws_routes = Router::new()
        .route("/ws/conversations/{id}", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_websocket,
        ));

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(ws_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .layer(create_cors_layer(&state.settings.cors))
        .layer(create_security_headers_layer())
        .with_state(state)
}
