//! Chat Handlers
//!
//! REST access to conversations and messages. Sending over REST persists
//! through the same service as the WebSocket path and then fans out to any
//! sockets joined to the conversation room.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::application::dto::{
    ConversationResponse, MessageQueryParams, MessageResponse, OpenConversationRequest,
    SendMessageRequest,
};
use crate::application::services::{ChatError, ChatService, ChatServiceImpl};
use crate::domain::Party;
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{
    PgAccountRepository, PgConversationRepository, PgMessageRepository, PgNotificationRepository,
};
use crate::presentation::http::extractors::AuthUser;
use crate::presentation::http::handlers::{parse_body_id, parse_role};
use crate::presentation::websocket::messages::ServerEvent;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::NotFound => AppError::NotFound("Conversation not found".into()),
            ChatError::AccountNotFound => AppError::NotFound("Account not found".into()),
            ChatError::Forbidden => {
                AppError::Forbidden("Not a participant of this conversation".into())
            }
            ChatError::InvalidPair => {
                AppError::BadRequest("A conversation needs exactly one agent".into())
            }
            ChatError::EmptyMessage => AppError::BadRequest("Message content is empty".into()),
            ChatError::ContentTooLong => AppError::BadRequest("Message content is too long".into()),
            ChatError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type ChatSvc = ChatServiceImpl<
    PgConversationRepository,
    PgMessageRepository,
    PgAccountRepository,
    PgNotificationRepository,
>;

pub(crate) fn chat_service(state: &AppState) -> ChatSvc {
    ChatServiceImpl::new(
        Arc::new(PgConversationRepository::new(state.db.clone())),
        Arc::new(PgMessageRepository::new(state.db.clone())),
        Arc::new(PgAccountRepository::new(state.db.clone())),
        Arc::new(PgNotificationRepository::new(state.db.clone())),
        state.snowflake.clone(),
        state.settings.chat.clone(),
    )
}

/// POST /api/v1/conversations
pub async fn open(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<OpenConversationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let other = Party::new(
        parse_role(&request.other_role)?,
        parse_body_id(&request.other_id)?,
    );
    let listing_id = request.listing_id.as_deref().map(parse_body_id).transpose()?;

    let conversation = chat_service(&state)
        .open_conversation(user.party, other, listing_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ConversationResponse::for_viewer(conversation, user.party)),
    ))
}

/// GET /api/v1/conversations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ConversationResponse>>, AppError> {
    let conversations = chat_service(&state).list_conversations(user.party).await?;

    Ok(Json(
        conversations
            .into_iter()
            .map(|c| ConversationResponse::for_viewer(c, user.party))
            .collect(),
    ))
}

/// GET /api/v1/conversations/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = chat_service(&state).get_conversation(user.party, id).await?;

    Ok(Json(ConversationResponse::for_viewer(
        conversation,
        user.party,
    )))
}

/// GET /api/v1/conversations/{id}/messages
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Query(params): Query<MessageQueryParams>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let before = params.before.as_deref().map(parse_body_id).transpose()?;

    let messages = chat_service(&state)
        .history(user.party, id, before, params.limit)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/conversations/{id}/messages
pub async fn send(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let sent = chat_service(&state)
        .send_message(user.party, id, &request.content)
        .await?;

    metrics::record_chat_message("rest");

    let response = MessageResponse::from(sent.message);

    // Fan out to sockets in the conversation room; counterparts without a
    // socket in the room get a notify push on their other connections
    state.gateway.broadcast_to_room(
        id,
        ServerEvent::Message {
            message: response.clone(),
        },
        None,
    );
    if !state.gateway.room_contains(id, sent.counterpart) {
        state.gateway.send_to_account(
            sent.counterpart,
            ServerEvent::Notify {
                conversation_id: id.to_string(),
                preview: response.content.clone(),
            },
        );
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/conversations/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    chat_service(&state).mark_read(user.party, id).await?;

    // Let the counterpart's sockets update their read receipts
    state.gateway.broadcast_to_room(
        id,
        ServerEvent::Read {
            reader_role: user.party.role.as_str().to_string(),
            reader_id: user.party.id.to_string(),
        },
        None,
    );

    Ok(StatusCode::NO_CONTENT)
}
