//! WebSocket Chat Channel
//!
//! Real-time messaging for conversations. A socket connects to one
//! conversation room, authenticates with a query-string token, receives a
//! history replay and then exchanges events with the room.

pub mod gateway;
pub mod handler;
pub mod messages;

pub use gateway::ChatGateway;
pub use handler::ws_handler;
