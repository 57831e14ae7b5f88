use std::sync::Arc;

use crate::{access::PermissionEngine, chat::ChatService, config::AppConfig, task::TaskService};

#[derive(Clone)]
pub struct ChatState {
    pub chats: Arc<ChatService>,
    pub permissions: PermissionEngine,
    pub config: Arc<AppConfig>,
}

impl ChatState {
    pub fn new(chats: ChatService, permissions: PermissionEngine, config: AppConfig) -> Self {
        Self {
            chats: Arc::new(chats),
            permissions,
            config: Arc::new(config),
        }
    }
}

#[derive(Clone)]
pub struct TaskState {
    pub tasks: Arc<TaskService>,
    pub config: Arc<AppConfig>,
}

impl TaskState {
    pub fn new(tasks: TaskService, config: AppConfig) -> Self {
        Self {
            tasks: Arc::new(tasks),
            config: Arc::new(config),
        }
    }
}
