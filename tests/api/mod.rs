//! REST API endpoint tests

mod auth_tests;
mod chat_tests;
mod health_tests;
mod listing_tests;
mod privacy_tests;
mod showing_tests;
