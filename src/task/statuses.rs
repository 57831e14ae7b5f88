use serde::Deserialize;
use tracing::info;

use crate::error::{ServiceError, ServiceResult};

use super::{StatusView, TaskService};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStatusInput {
    pub name: String,
}

impl TaskService {
    pub fn create_status(&self, input: CreateStatusInput) -> ServiceResult<StatusView> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("status name must not be empty".into()));
        }
        let status = self.tasks.create_status(name)?;
        info!(status_id = status.id, status = %status.name, "task status created");
        Ok(status.into())
    }

    pub fn get_status(&self, status_id: i32) -> ServiceResult<StatusView> {
        self.tasks
            .find_status(status_id)?
            .map(Into::into)
            .ok_or_else(|| ServiceError::TaskStatusNotFound(status_id.to_string()))
    }

    pub fn list_statuses(&self) -> ServiceResult<Vec<StatusView>> {
        let statuses = self.tasks.list_statuses()?;
        Ok(statuses.into_iter().map(Into::into).collect())
    }

    /// Statuses still referenced by tasks cannot be deleted.
    pub fn delete_status(&self, status_id: i32) -> ServiceResult<()> {
        if !self.tasks.delete_status(status_id)? {
            return Err(ServiceError::TaskStatusNotFound(status_id.to_string()));
        }
        info!(status_id, "task status deleted");
        Ok(())
    }
}
