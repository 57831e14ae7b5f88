use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::CallerId;
use crate::chat::{MessageView, SearchResult, SendMessageInput};
use crate::error::{AppError, AppResult, ServiceError};
use crate::paging::{Page, PageQuery, MAX_SEARCH_LIMIT};
use crate::state::ChatState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn send_message(
    State(state): State<ChatState>,
    CallerId(sender_id): CallerId,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<SendMessageInput>,
) -> AppResult<(StatusCode, Json<MessageView>)> {
    let message = state
        .chats
        .send_message(sender_id, chat_id, payload)
        .await
        .map_err(|err| match err {
            ServiceError::InvalidCredentials => err.into_app_error(StatusCode::UNAUTHORIZED),
            ServiceError::UserGateway { .. } | ServiceError::FileNotFound(_) => {
                err.into_app_error(StatusCode::BAD_REQUEST)
            }
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn chat_messages(
    State(state): State<ChatState>,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<MessageView>>> {
    let page = Page::from_query(query)?;
    let messages = state
        .chats
        .chat_messages(chat_id, page)
        .await
        .map_err(|err| match err {
            ServiceError::InvalidCredentials => AppError::bad_request("chat not found"),
            ServiceError::FileNotFound(_) => err.into_app_error(StatusCode::BAD_GATEWAY),
            other => other.into(),
        })?;
    Ok(Json(messages))
}

pub async fn search_messages(
    State(state): State<ChatState>,
    CallerId(user_id): CallerId,
    Path(chat_id): Path<Uuid>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResult>> {
    let page = Page::from_query_capped(
        PageQuery {
            limit: params.limit,
            offset: params.offset,
        },
        MAX_SEARCH_LIMIT,
    )?;
    let result = state
        .chats
        .search_messages(user_id, chat_id, &params.query, page)?;
    Ok(Json(result))
}
