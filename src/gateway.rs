//! Outbound lookups against the user, file and chat services.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {service} service failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} service responded with {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("user service returned no user")]
    MissingUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "ID")]
    pub id: Uuid,
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Email", default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub file_type_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(alias = "ID")]
    pub id: Uuid,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "isGroup", alias = "IsGroup", default)]
    pub is_group: bool,
}

#[async_trait]
pub trait ServiceGateway: Send + Sync + 'static {
    async fn user(&self, user_id: Uuid) -> Result<UserProfile, GatewayError>;

    async fn file(&self, file_id: i32) -> Result<FileInfo, GatewayError>;

    async fn chat(&self, chat_id: Uuid) -> Result<ChatSummary, GatewayError>;
}

/// Looks up all files concurrently. Results keep the order of `file_ids`.
pub async fn resolve_files(
    gateway: &dyn ServiceGateway,
    file_ids: &[i32],
) -> Vec<Result<FileInfo, GatewayError>> {
    join_all(file_ids.iter().map(|file_id| gateway.file(*file_id))).await
}

pub async fn require_user(
    gateway: &dyn ServiceGateway,
    user_id: Uuid,
) -> ServiceResult<UserProfile> {
    gateway
        .user(user_id)
        .await
        .map_err(|err| ServiceError::UserGateway {
            user_id,
            message: err.to_string(),
        })
}

pub async fn require_chat(
    gateway: &dyn ServiceGateway,
    chat_id: Uuid,
) -> ServiceResult<ChatSummary> {
    gateway
        .chat(chat_id)
        .await
        .map_err(|err| ServiceError::ChatGateway {
            chat_id,
            message: err.to_string(),
        })
}

fn check_file(file_id: i32, result: Result<FileInfo, GatewayError>) -> ServiceResult<FileInfo> {
    let file = result.map_err(|err| ServiceError::FileGateway {
        file_id,
        message: err.to_string(),
    })?;
    if file.id <= 0 {
        return Err(ServiceError::FileNotFound(file_id));
    }
    Ok(file)
}

/// A file that resolves to a non-positive id counts as missing.
pub async fn require_file(gateway: &dyn ServiceGateway, file_id: i32) -> ServiceResult<FileInfo> {
    check_file(file_id, gateway.file(file_id).await)
}

/// Resolves every file, failing on the first bad id in request order.
pub async fn require_files(
    gateway: &dyn ServiceGateway,
    file_ids: &[i32],
) -> ServiceResult<Vec<FileInfo>> {
    file_ids
        .iter()
        .zip(resolve_files(gateway, file_ids).await)
        .map(|(file_id, result)| check_file(*file_id, result))
        .collect()
}

pub struct HttpGateway {
    client: Client,
    user_base: String,
    file_base: String,
    chat_base: String,
}

impl HttpGateway {
    pub fn new(
        client: Client,
        user_base: impl Into<String>,
        file_base: impl Into<String>,
        chat_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            user_base: user_base.into(),
            file_base: file_base.into(),
            chat_base: chat_base.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.gateway_timeout_secs))
            .build()?;
        Ok(Self::new(
            client,
            &config.user_service_url,
            &config.file_service_url,
            &config.chat_service_url,
        ))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: String,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { service, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                service,
                status,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| GatewayError::Transport { service, source })
    }
}

#[async_trait]
impl ServiceGateway for HttpGateway {
    async fn user(&self, user_id: Uuid) -> Result<UserProfile, GatewayError> {
        let url = format!("{}/api/v1/users/{user_id}", self.user_base);
        let envelope: UserEnvelope = self.get_json("user", url).await?;
        envelope.user.ok_or(GatewayError::MissingUser)
    }

    async fn file(&self, file_id: i32) -> Result<FileInfo, GatewayError> {
        let url = format!("{}/api/v1/files/{file_id}", self.file_base);
        self.get_json("file", url).await
    }

    async fn chat(&self, chat_id: Uuid) -> Result<ChatSummary, GatewayError> {
        let url = format!("{}/api/v1/chats/{chat_id}", self.chat_base);
        self.get_json("chat", url).await
    }
}
