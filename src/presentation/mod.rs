//! Presentation Layer
//!
//! HTTP routes, request handlers, middleware and the WebSocket chat channel.

pub mod http;
pub mod middleware;
pub mod websocket;
