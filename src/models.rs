use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chats)]
pub struct Chat {
    pub id: Uuid,
    pub name: String,
    pub is_group: bool,
    pub description: Option<String>,
    pub avatar_file_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chats)]
pub struct NewChat {
    pub id: Uuid,
    pub name: String,
    pub is_group: bool,
    pub description: Option<String>,
    pub avatar_file_id: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = chats, treat_none_as_null = true)]
pub struct ChatChangeset<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub avatar_file_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chat_permissions)]
pub struct ChatPermission {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chat_roles)]
pub struct ChatRole {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = chat_users)]
pub struct ChatUser {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub role_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = message_files)]
pub struct MessageFile {
    pub message_id: Uuid,
    pub file_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = task_statuses)]
pub struct TaskStatus {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tasks)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status_id: i32,
    pub creator_id: Uuid,
    pub executor_id: Option<Uuid>,
    pub chat_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status_id: i32,
    pub creator_id: Uuid,
    pub executor_id: Option<Uuid>,
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_files)]
pub struct TaskFile {
    pub task_id: i32,
    pub file_id: i32,
}

/// A role together with its full permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleWithPermissions {
    pub id: i32,
    pub name: String,
    pub permissions: Vec<ChatPermission>,
}

impl RoleWithPermissions {
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p.name == permission)
    }
}

/// A user's membership in a chat, loaded with the role it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub role: RoleWithPermissions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: Uuid,
    pub role_id: i32,
    pub role_name: String,
}

#[derive(Debug, Clone)]
pub struct MessageWithFiles {
    pub message: Message,
    pub file_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct TaskWithFiles {
    pub task: Task,
    pub status: TaskStatus,
    pub file_ids: Vec<i32>,
}

#[derive(Debug, Clone, Queryable)]
pub struct TaskListEntry {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
