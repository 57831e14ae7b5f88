//! Storage seams for the chat and task services.
//!
//! Every method that touches more than one row is atomic: implementations
//! either apply all writes or none.

pub mod pg;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Chat, ChatPermission, ChatUser, Member, Membership, Message, MessageWithFiles, NewChat,
    NewMessage, NewTask, RoleWithPermissions, TaskListEntry, TaskStatus, TaskWithFiles,
};
use crate::paging::Page;

pub use pg::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait MembershipStore: Send + Sync + 'static {
    fn find_chat(&self, chat_id: Uuid) -> StoreResult<Option<Chat>>;

    fn list_user_chats(&self, user_id: Uuid) -> StoreResult<Vec<Chat>>;

    /// Inserts the chat and all of its initial memberships.
    fn create_chat(&self, chat: &NewChat, members: &[ChatUser]) -> StoreResult<()>;

    /// Saves the chat fields, then inserts `added` and deletes the `removed` user ids.
    fn update_chat(&self, chat: &Chat, added: &[ChatUser], removed: &[Uuid]) -> StoreResult<()>;

    /// Removes the chat together with its memberships and messages.
    fn delete_chat(&self, chat_id: Uuid) -> StoreResult<()>;

    fn find_membership(&self, chat_id: Uuid, user_id: Uuid) -> StoreResult<Option<Membership>>;

    fn list_members(&self, chat_id: Uuid) -> StoreResult<Vec<Member>>;

    /// Returns `false` when no membership row matched.
    fn set_member_role(&self, chat_id: Uuid, user_id: Uuid, role_id: i32) -> StoreResult<bool>;
}

pub trait RoleStore: Send + Sync + 'static {
    fn find_role(&self, role_id: i32) -> StoreResult<Option<RoleWithPermissions>>;

    fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleWithPermissions>>;

    fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>>;

    fn create_role(&self, name: &str, permission_ids: &[i32]) -> StoreResult<RoleWithPermissions>;

    fn delete_role(&self, role_id: i32) -> StoreResult<bool>;

    /// Replaces the permission set of a role.
    fn set_role_permissions(&self, role_id: i32, permission_ids: &[i32]) -> StoreResult<()>;

    fn find_permission(&self, permission_id: i32) -> StoreResult<Option<ChatPermission>>;

    fn list_permissions(&self) -> StoreResult<Vec<ChatPermission>>;

    fn create_permission(&self, name: &str) -> StoreResult<ChatPermission>;

    fn delete_permission(&self, permission_id: i32) -> StoreResult<bool>;
}

pub trait MessageStore: Send + Sync + 'static {
    /// Inserts the message and its file references, then reads them back.
    fn create_message(&self, message: &NewMessage, file_ids: &[i32])
        -> StoreResult<MessageWithFiles>;

    /// Newest first.
    fn chat_messages(&self, chat_id: Uuid, page: Page) -> StoreResult<Vec<MessageWithFiles>>;

    /// Case-insensitive substring search, newest first. Returns the page and
    /// the total number of matches.
    fn search_messages(
        &self,
        chat_id: Uuid,
        query: &str,
        page: Page,
    ) -> StoreResult<(Vec<Message>, i64)>;
}

pub trait TaskStore: Send + Sync + 'static {
    fn find_status(&self, status_id: i32) -> StoreResult<Option<TaskStatus>>;

    fn find_status_by_name(&self, name: &str) -> StoreResult<Option<TaskStatus>>;

    fn list_statuses(&self) -> StoreResult<Vec<TaskStatus>>;

    fn create_status(&self, name: &str) -> StoreResult<TaskStatus>;

    fn delete_status(&self, status_id: i32) -> StoreResult<bool>;

    /// Inserts the task and its file references.
    fn create_task(&self, task: &NewTask, file_ids: &[i32]) -> StoreResult<TaskWithFiles>;

    /// Returns `false` when the task does not exist.
    fn update_task_status(&self, task_id: i32, status_id: i32) -> StoreResult<bool>;

    fn find_task(&self, task_id: i32) -> StoreResult<Option<TaskWithFiles>>;

    /// Tasks assigned to `user_id`, newest first.
    fn executor_tasks(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<TaskListEntry>>;
}
