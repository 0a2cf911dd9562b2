//! WebSocket Event Types
//!
//! JSON events exchanged over a conversation socket, tagged with a `type`
//! field on both directions.

use serde::{Deserialize, Serialize};

use crate::application::dto::MessageResponse;

/// Events a client may send
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Send a message to the conversation
    Message { content: String },
    /// The client is typing
    Typing,
    /// Reset the sender's unread counter
    MarkRead,
}

/// Events the server sends
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Replay of recent messages, sent once after joining
    History { messages: Vec<MessageResponse> },
    /// A new message in the conversation
    Message { message: MessageResponse },
    /// The counterpart is typing
    Typing {
        sender_role: String,
        sender_id: String,
    },
    /// The counterpart read the conversation
    Read {
        reader_role: String,
        reader_id: String,
    },
    /// Activity in another conversation of this account
    Notify {
        conversation_id: String,
        preview: String,
    },
    /// A client event was rejected
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_parsing() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"message","content":"hi there"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Message { content } if content == "hi there"));

        let event: ClientEvent = serde_json::from_str(r#"{"type":"typing"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Typing));

        let event: ClientEvent = serde_json::from_str(r#"{"type":"mark_read"}"#).unwrap();
        assert!(matches!(event, ClientEvent::MarkRead));
    }

    #[test]
    fn test_unknown_client_event_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_event_tagging() {
        let event = ServerEvent::Read {
            reader_role: "agent".into(),
            reader_id: "7".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "read");
        assert_eq!(json["reader_role"], "agent");
    }
}
