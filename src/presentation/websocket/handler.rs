//! WebSocket Connection Handler
//!
//! One socket per conversation. The client authenticates with a `token`
//! query parameter because browsers cannot set headers on WebSocket
//! upgrades. After the access check the socket gets a history replay and
//! joins the room.

use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

use super::messages::{ClientEvent, ServerEvent};
use crate::application::dto::MessageResponse;
use crate::application::services::{ChatError, ChatService};
use crate::domain::Party;
use crate::infrastructure::metrics;
use crate::presentation::http::handlers::chat::chat_service;
use crate::startup::AppState;

/// Close code for failed authentication or access checks
const POLICY_VIOLATION: u16 = 1008;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /ws/conversations/{id}?token=...
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(conversation_id): Path<i64>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let max_message_size = state.settings.websocket.max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, conversation_id, query.token))
}

async fn handle_socket(socket: WebSocket, state: AppState, conversation_id: i64, token: String) {
    let socket_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    // Authenticate before anything else touches the database
    let party = match authenticate(&state, &token) {
        Ok(party) => party,
        Err(reason) => {
            tracing::debug!(conversation_id, %socket_id, reason, "WebSocket auth failed");
            close_with_policy_violation(&mut sink, reason).await;
            return;
        }
    };

    // Access guard: the same participant check the REST API runs
    let service = chat_service(&state);
    if let Err(e) = service.get_conversation(party, conversation_id).await {
        let reason = match e {
            ChatError::NotFound => "conversation not found",
            ChatError::Forbidden => "not a participant",
            _ => "access check failed",
        };
        tracing::debug!(conversation_id, %socket_id, reason, "WebSocket access denied");
        close_with_policy_violation(&mut sink, reason).await;
        return;
    }

    // Outgoing events flow through a channel so the gateway can push from
    // other tasks; the sender task also owns the heartbeat
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let heartbeat = Duration::from_millis(state.settings.websocket.heartbeat_interval_ms);

    let sender_task = tokio::spawn(async move {
        let mut ping = interval(heartbeat);
        ping.tick().await; // skip the immediate first tick
        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let text = match serde_json::to_string(&event) {
                        Ok(t) => t,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize server event");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Join before the replay so a message persisted while history is being
    // fetched still reaches this socket. The client may see such a message
    // twice (queued live and inside the replay); it can never miss one.
    state.gateway.join(conversation_id, socket_id, party, tx.clone());

    // History replay, which also resets the reader's unread counter
    match service
        .history(party, conversation_id, None, None)
        .await
    {
        Ok(messages) => {
            let _ = tx.send(ServerEvent::History {
                messages: messages.into_iter().map(MessageResponse::from).collect(),
            });
        }
        Err(e) => {
            tracing::warn!(conversation_id, error = %e, "History replay failed");
            let _ = tx.send(ServerEvent::Error {
                message: "Failed to load history".into(),
            });
        }
    }

    tracing::info!(
        conversation_id,
        %socket_id,
        role = %party.role,
        account_id = party.id,
        "WebSocket connected"
    );

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_client_event(&state, party, conversation_id, socket_id, &text, &tx).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Binary(_)) => {}
            Err(e) => {
                tracing::debug!(conversation_id, %socket_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    state.gateway.leave(conversation_id, socket_id, party);
    sender_task.abort();

    tracing::info!(conversation_id, %socket_id, "WebSocket disconnected");
}

fn authenticate(state: &AppState, token: &str) -> Result<Party, &'static str> {
    use crate::application::services::decode_access_token;

    let claims = decode_access_token(token, &state.settings.jwt.secret)
        .map_err(|_| "invalid or expired token")?;
    claims.party().map_err(|_| "invalid token claims")
}

async fn close_with_policy_violation(
    sink: &mut SplitSink<WebSocket, Message>,
    reason: &'static str,
) {
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code: POLICY_VIOLATION,
            reason: reason.into(),
        })))
        .await;
}

async fn handle_client_event(
    state: &AppState,
    party: Party,
    conversation_id: i64,
    socket_id: Uuid,
    text: &str,
    tx: &mpsc::UnboundedSender<ServerEvent>,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(_) => {
            let _ = tx.send(ServerEvent::Error {
                message: "Unrecognized event".into(),
            });
            return;
        }
    };

    let service = chat_service(state);

    match event {
        ClientEvent::Message { content } => {
            match service.send_message(party, conversation_id, &content).await {
                Ok(sent) => {
                    metrics::record_chat_message("socket");

                    let response = MessageResponse::from(sent.message);
                    state.gateway.broadcast_to_room(
                        conversation_id,
                        ServerEvent::Message {
                            message: response.clone(),
                        },
                        None,
                    );
                    if !state.gateway.room_contains(conversation_id, sent.counterpart) {
                        state.gateway.send_to_account(
                            sent.counterpart,
                            ServerEvent::Notify {
                                conversation_id: conversation_id.to_string(),
                                preview: response.content.clone(),
                            },
                        );
                    }
                }
                Err(e) => {
                    let _ = tx.send(ServerEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
        ClientEvent::Typing => {
            state.gateway.broadcast_to_room(
                conversation_id,
                ServerEvent::Typing {
                    sender_role: party.role.as_str().to_string(),
                    sender_id: party.id.to_string(),
                },
                Some(socket_id),
            );
        }
        ClientEvent::MarkRead => match service.mark_read(party, conversation_id).await {
            Ok(()) => {
                state.gateway.broadcast_to_room(
                    conversation_id,
                    ServerEvent::Read {
                        reader_role: party.role.as_str().to_string(),
                        reader_id: party.id.to_string(),
                    },
                    Some(socket_id),
                );
            }
            Err(e) => {
                let _ = tx.send(ServerEvent::Error {
                    message: e.to_string(),
                });
            }
        },
    }
}
