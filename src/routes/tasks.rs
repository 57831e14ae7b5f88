use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppResult, ServiceError};
use crate::paging::{Page, PageQuery};
use crate::state::TaskState;
use crate::task::{CreateStatusInput, CreateTaskInput, StatusView, TaskListView, TaskResponse};

#[derive(Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

pub async fn create_task(
    State(state): State<TaskState>,
    Json(payload): Json<CreateTaskInput>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let task = state.tasks.create(payload).await.map_err(|err| match err {
        ServiceError::TaskStatusNotFound(_) | ServiceError::FileNotFound(_) => {
            err.into_app_error(StatusCode::BAD_REQUEST)
        }
        other => other.into(),
    })?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_status(
    State(state): State<TaskState>,
    Path((task_id, status_id)): Path<(i32, i32)>,
) -> AppResult<Json<StatusMessage>> {
    state
        .tasks
        .update_status(task_id, status_id)
        .map_err(|err| match err {
            ServiceError::TaskStatusNotFound(_) | ServiceError::TaskNotFound(_) => {
                err.into_app_error(StatusCode::BAD_REQUEST)
            }
            other => other.into(),
        })?;
    Ok(Json(StatusMessage {
        message: "task status updated",
    }))
}

pub async fn get_task(
    State(state): State<TaskState>,
    Path(task_id): Path<i32>,
) -> AppResult<Json<TaskResponse>> {
    let task = state.tasks.get(task_id).await.map_err(|err| match err {
        ServiceError::FileNotFound(_) => err.into_app_error(StatusCode::BAD_GATEWAY),
        other => other.into(),
    })?;
    Ok(Json(task))
}

pub async fn user_tasks(
    State(state): State<TaskState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<TaskListView>>> {
    let page = Page::from_query(query)?;
    Ok(Json(state.tasks.executor_tasks(user_id, page)?))
}

pub async fn create_status(
    State(state): State<TaskState>,
    Json(payload): Json<CreateStatusInput>,
) -> AppResult<(StatusCode, Json<StatusView>)> {
    let status = state.tasks.create_status(payload)?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn list_statuses(State(state): State<TaskState>) -> AppResult<Json<Vec<StatusView>>> {
    Ok(Json(state.tasks.list_statuses()?))
}

pub async fn get_status(
    State(state): State<TaskState>,
    Path(status_id): Path<i32>,
) -> AppResult<Json<StatusView>> {
    Ok(Json(state.tasks.get_status(status_id)?))
}

pub async fn delete_status(
    State(state): State<TaskState>,
    Path(status_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.tasks.delete_status(status_id)?;
    Ok(StatusCode::NO_CONTENT)
}
