//! Task orchestration and task status administration.

mod statuses;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::{self, FileInfo, ServiceGateway};
use crate::models::{NewTask, TaskListEntry, TaskStatus, TaskWithFiles};
use crate::notify::{creator_name, NotificationPayload, Notifier};
use crate::paging::Page;
use crate::store::TaskStore;
use crate::utils::dedup_ordered;

pub use statuses::CreateStatusInput;

/// Status every new task starts in.
pub const INITIAL_STATUS: &str = "created";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub creator_id: Uuid,
    /// The nil UUID means unassigned.
    #[serde(default)]
    pub executor_id: Option<Uuid>,
    /// The nil UUID means no chat.
    #[serde(default)]
    pub chat_id: Option<Uuid>,
    #[serde(default)]
    pub file_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub id: i32,
    pub name: String,
}

impl From<TaskStatus> for StatusView {
    fn from(status: TaskStatus) -> Self {
        Self {
            id: status.id,
            name: status.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status_id: i32,
    pub status: StatusView,
    pub creator_id: Uuid,
    pub executor_id: Option<Uuid>,
    pub chat_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub file_ids: Vec<i32>,
}

impl From<TaskWithFiles> for TaskView {
    fn from(stored: TaskWithFiles) -> Self {
        let task = stored.task;
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status_id: task.status_id,
            status: stored.status.into(),
            creator_id: task.creator_id,
            executor_id: task.executor_id,
            chat_id: task.chat_id,
            created_at: task.created_at,
            file_ids: stored.file_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub task: TaskView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileInfo>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListView {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<TaskListEntry> for TaskListView {
    fn from(entry: TaskListEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            status: entry.status,
            created_at: entry.created_at,
        }
    }
}

fn non_nil(id: Option<Uuid>) -> Option<Uuid> {
    id.filter(|id| !id.is_nil())
}

pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    gateway: Arc<dyn ServiceGateway>,
    notifier: Notifier,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        gateway: Arc<dyn ServiceGateway>,
        notifier: Notifier,
    ) -> Self {
        Self {
            tasks,
            gateway,
            notifier,
        }
    }

    /// Validates the creator, executor, chat and files, then stores the task
    /// together with its file references and notifies the executor.
    pub async fn create(&self, input: CreateTaskInput) -> ServiceResult<TaskResponse> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("task title must not be empty".into()));
        }

        let status = self
            .tasks
            .find_status_by_name(INITIAL_STATUS)?
            .ok_or_else(|| ServiceError::TaskStatusNotFound(INITIAL_STATUS.into()))?;

        let creator = gateway::require_user(self.gateway.as_ref(), input.creator_id).await?;

        let executor_id = non_nil(input.executor_id);
        let executor = match executor_id {
            Some(user_id) => Some(gateway::require_user(self.gateway.as_ref(), user_id).await?),
            None => None,
        };

        let chat_id = non_nil(input.chat_id);
        if let Some(chat_id) = chat_id {
            gateway::require_chat(self.gateway.as_ref(), chat_id).await?;
        }

        let file_ids = dedup_ordered(&input.file_ids);
        gateway::require_files(self.gateway.as_ref(), &file_ids).await?;

        let task = NewTask {
            title: title.to_string(),
            description: input.description,
            status_id: status.id,
            creator_id: creator.id,
            executor_id,
            chat_id,
        };
        let stored = self.tasks.create_task(&task, &file_ids)?;
        info!(task_id = stored.task.id, creator_id = %creator.id, "task created");

        if let Some(executor) = executor {
            self.notifier
                .dispatch(
                    &executor.email,
                    NotificationPayload::NewTask {
                        task_id: stored.task.id,
                        task_title: stored.task.title.clone(),
                        creator_name: creator_name(&creator.username),
                        executor_id: Some(executor.id),
                    },
                )
                .await;
        }

        Ok(TaskResponse {
            task: stored.into(),
            files: None,
        })
    }

    pub fn update_status(&self, task_id: i32, status_id: i32) -> ServiceResult<()> {
        if self.tasks.find_status(status_id)?.is_none() {
            return Err(ServiceError::TaskStatusNotFound(status_id.to_string()));
        }
        if !self.tasks.update_task_status(task_id, status_id)? {
            return Err(ServiceError::TaskNotFound(task_id));
        }
        info!(task_id, status_id, "task status updated");
        Ok(())
    }

    /// Fetches a task with its attached files resolved.
    pub async fn get(&self, task_id: i32) -> ServiceResult<TaskResponse> {
        let stored = self
            .tasks
            .find_task(task_id)?
            .ok_or(ServiceError::TaskNotFound(task_id))?;
        let files = gateway::require_files(self.gateway.as_ref(), &stored.file_ids).await?;
        Ok(TaskResponse {
            task: stored.into(),
            files: Some(files),
        })
    }

    pub fn executor_tasks(&self, user_id: Uuid, page: Page) -> ServiceResult<Vec<TaskListView>> {
        let entries = self.tasks.executor_tasks(user_id, page)?;
        Ok(entries.into_iter().map(Into::into).collect())
    }
}
