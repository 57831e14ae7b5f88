use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Failures raised by the chat and task orchestrators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user is not a member of this chat")]
    NotChatMember,
    #[error("user not found in chat")]
    UserNotInChat,
    #[error("chat with provided ID not found")]
    ChatNotFound,
    #[error("query parameter cannot be empty")]
    EmptyQuery,
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),
    #[error("{0}")]
    Validation(String),
    #[error("can't get file with incorrect id: {0}")]
    FileNotFound(i32),
    #[error("task with id {0} not found")]
    TaskNotFound(i32),
    #[error("task status {0} not found")]
    TaskStatusNotFound(String),
    #[error("chat role with id {0} not found")]
    RoleNotFound(i32),
    #[error("chat permission with id {0} not found")]
    PermissionNotFound(i32),
    #[error("{0}")]
    Conflict(String),
    #[error("can't get file with id: {file_id}, error: {message}")]
    FileGateway { file_id: i32, message: String },
    #[error("can't get user with id: {user_id}, error: {message}")]
    UserGateway { user_id: Uuid, message: String },
    #[error("can't get chat with id: {chat_id}, error: {message}")]
    ChatGateway { chat_id: Uuid, message: String },
    #[error("error of db: {0}")]
    Database(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Status used when a route has no more specific mapping.
    pub fn default_status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidCredentials
            | ServiceError::EmptyQuery
            | ServiceError::InvalidPagination(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotChatMember => StatusCode::FORBIDDEN,
            ServiceError::UserNotInChat
            | ServiceError::ChatNotFound
            | ServiceError::FileNotFound(_)
            | ServiceError::TaskNotFound(_)
            | ServiceError::TaskStatusNotFound(_)
            | ServiceError::RoleNotFound(_)
            | ServiceError::PermissionNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::FileGateway { .. }
            | ServiceError::UserGateway { .. }
            | ServiceError::ChatGateway { .. } => StatusCode::BAD_GATEWAY,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_gateway(&self) -> bool {
        matches!(
            self,
            ServiceError::FileGateway { .. }
                | ServiceError::UserGateway { .. }
                | ServiceError::ChatGateway { .. }
        )
    }

    /// Renders the error with an explicit status. Server errors are logged.
    pub fn into_app_error(self, status: StatusCode) -> AppError {
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        }
        AppError::new(status, self.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(message) => ServiceError::Conflict(message),
            other => ServiceError::Database(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        let status = value.default_status();
        value.into_app_error(status)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}
