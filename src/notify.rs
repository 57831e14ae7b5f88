//! Best-effort notifications about new chats and tasks.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;

/// Creator shown when the creator has no username.
pub const UNKNOWN_CREATOR: &str = "Unknown user";

pub fn creator_name(username: &str) -> String {
    if username.trim().is_empty() {
        UNKNOWN_CREATOR.to_string()
    } else {
        username.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationPayload {
    NewChat {
        chat_id: Uuid,
        chat_name: String,
        creator_name: String,
        is_group: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    NewTask {
        task_id: i32,
        task_title: String,
        creator_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        executor_id: Option<Uuid>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: NotificationPayload,
}

impl Notification {
    pub fn new(email: impl Into<String>, payload: NotificationPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            created_at: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.payload {
            NotificationPayload::NewChat { .. } => "new_chat",
            NotificationPayload::NewTask { .. } => "new_task",
        }
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Posts notifications as JSON to a webhook.
pub struct HttpNotificationSink {
    client: Client,
    endpoint: String,
}

impl HttpNotificationSink {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await
            .context("failed to reach notification service")?
            .error_for_status()
            .context("notification service rejected notification")?;
        Ok(())
    }
}

/// Used when no notification service is configured.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            notification_id = %notification.id,
            kind = notification.kind(),
            email = %notification.email,
            "notification dispatched"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Posts to `NOTIFICATION_SERVICE_URL` when set, otherwise only logs.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let sink: Arc<dyn NotificationSink> = match config.notification_service_url.as_deref() {
            Some(endpoint) => {
                let client = Client::builder()
                    .timeout(std::time::Duration::from_secs(config.gateway_timeout_secs))
                    .build()
                    .context("failed to build notification client")?;
                Arc::new(HttpNotificationSink::new(client, endpoint))
            }
            None => Arc::new(LogNotificationSink),
        };
        Ok(Self::new(sink))
    }

    /// Sends a notification, logging any failure. Never fails the caller.
    pub async fn dispatch(&self, email: &str, payload: NotificationPayload) {
        if email.trim().is_empty() {
            return;
        }

        let notification = Notification::new(email, payload);
        if let Err(err) = self.sink.send(&notification).await {
            warn!(
                notification_id = %notification.id,
                kind = notification.kind(),
                error = %err,
                "failed to send notification"
            );
        }
    }
}
