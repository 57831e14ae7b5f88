use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::CallerId;
use crate::chat::{
    ChatView, CreateChatInput, MemberView, MyRoleView, UpdateChatInput, UpdateChatOutput,
    UserRoleView,
};
use crate::error::AppResult;
use crate::state::ChatState;

#[derive(Serialize)]
pub struct CreateChatResponse {
    pub chat_id: Uuid,
}

#[derive(Deserialize)]
pub struct ChangeRoleRequest {
    pub user_id: Uuid,
    pub role_id: i32,
}

#[derive(Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

pub async fn create_chat(
    State(state): State<ChatState>,
    Json(payload): Json<CreateChatInput>,
) -> AppResult<(StatusCode, Json<CreateChatResponse>)> {
    let chat_id = state.chats.create_chat(payload).await?;
    Ok((StatusCode::CREATED, Json(CreateChatResponse { chat_id })))
}

pub async fn update_chat(
    State(state): State<ChatState>,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<UpdateChatInput>,
) -> AppResult<Json<UpdateChatOutput>> {
    let output = state.chats.update_chat(chat_id, payload).await?;
    Ok(Json(output))
}

pub async fn delete_chat(
    State(state): State<ChatState>,
    Path(chat_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.chats.delete_chat(chat_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_chat(
    State(state): State<ChatState>,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<ChatView>> {
    Ok(Json(state.chats.get_chat(chat_id).await?))
}

pub async fn user_chats(
    State(state): State<ChatState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<ChatView>>> {
    Ok(Json(state.chats.user_chats(user_id).await?))
}

pub async fn change_role(
    State(state): State<ChatState>,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<Json<StatusMessage>> {
    state
        .chats
        .change_user_role(chat_id, payload.user_id, payload.role_id)?;
    Ok(Json(StatusMessage {
        message: "role changed",
    }))
}

pub async fn ban_user(
    State(state): State<ChatState>,
    Path((chat_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<StatusMessage>> {
    state.chats.ban_user(chat_id, user_id)?;
    Ok(Json(StatusMessage {
        message: "user banned",
    }))
}

pub async fn user_role(
    State(state): State<ChatState>,
    CallerId(requester_id): CallerId,
    Path((chat_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<UserRoleView>> {
    let role = state
        .chats
        .user_role_in_chat(chat_id, user_id, requester_id)?;
    Ok(Json(role))
}

pub async fn my_role(
    State(state): State<ChatState>,
    CallerId(user_id): CallerId,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<MyRoleView>> {
    Ok(Json(state.chats.my_role(chat_id, user_id)?))
}

pub async fn members(
    State(state): State<ChatState>,
    Path(chat_id): Path<Uuid>,
) -> AppResult<Json<Vec<MemberView>>> {
    Ok(Json(state.chats.members(chat_id)?))
}
