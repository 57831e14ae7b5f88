use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::chat::{
    CreatePermissionInput, CreateRoleInput, PermissionView, RoleView, UpdateRolePermissionsInput,
};
use crate::error::AppResult;
use crate::state::ChatState;

pub async fn list_roles(State(state): State<ChatState>) -> AppResult<Json<Vec<RoleView>>> {
    Ok(Json(state.chats.list_roles()?))
}

pub async fn get_role(
    State(state): State<ChatState>,
    Path(role_id): Path<i32>,
) -> AppResult<Json<RoleView>> {
    Ok(Json(state.chats.get_role(role_id)?))
}

pub async fn create_role(
    State(state): State<ChatState>,
    Json(payload): Json<CreateRoleInput>,
) -> AppResult<(StatusCode, Json<RoleView>)> {
    let role = state.chats.create_role(payload)?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn delete_role(
    State(state): State<ChatState>,
    Path(role_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.chats.delete_role(role_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role_permissions(
    State(state): State<ChatState>,
    Path(role_id): Path<i32>,
    Json(payload): Json<UpdateRolePermissionsInput>,
) -> AppResult<Json<RoleView>> {
    Ok(Json(state.chats.set_role_permissions(role_id, payload)?))
}

pub async fn list_permissions(
    State(state): State<ChatState>,
) -> AppResult<Json<Vec<PermissionView>>> {
    Ok(Json(state.chats.list_permissions()?))
}

pub async fn create_permission(
    State(state): State<ChatState>,
    Json(payload): Json<CreatePermissionInput>,
) -> AppResult<(StatusCode, Json<PermissionView>)> {
    let permission = state.chats.create_permission(payload)?;
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn delete_permission(
    State(state): State<ChatState>,
    Path(permission_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.chats.delete_permission(permission_id)?;
    Ok(StatusCode::NO_CONTENT)
}
