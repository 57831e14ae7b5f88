//! Chat orchestration: chats, memberships, messages and role administration.
//!
//! Every write validates its external references through the gateway first
//! and then hands all rows to the store in a single call.

mod admin;
mod chats;
mod messages;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::gateway::{FileInfo, ServiceGateway};
use crate::models::{Chat, ChatPermission, Member, Message, RoleWithPermissions};
use crate::notify::Notifier;
use crate::roles::SystemRoles;
use crate::store::{MembershipStore, MessageStore, RoleStore};

pub use admin::{CreatePermissionInput, CreateRoleInput, UpdateRolePermissionsInput};
pub use chats::{CreateChatInput, MembershipChange, UpdateChatInput, UpdateChatOutput, UpdateUser};
pub use messages::{SearchResult, SendMessageInput};

/// Shown as the creator of notifications about users added to an existing chat.
pub const CHAT_ADMINISTRATOR: &str = "chat administrator";

pub struct ChatService {
    memberships: Arc<dyn MembershipStore>,
    roles: Arc<dyn RoleStore>,
    messages: Arc<dyn MessageStore>,
    gateway: Arc<dyn ServiceGateway>,
    notifier: Notifier,
    system_roles: Arc<SystemRoles>,
}

impl ChatService {
    pub fn new<S>(
        store: Arc<S>,
        gateway: Arc<dyn ServiceGateway>,
        notifier: Notifier,
        system_roles: Arc<SystemRoles>,
    ) -> Self
    where
        S: MembershipStore + RoleStore + MessageStore,
    {
        Self {
            memberships: store.clone(),
            roles: store.clone(),
            messages: store,
            gateway,
            notifier,
            system_roles,
        }
    }

    pub fn system_roles(&self) -> &SystemRoles {
        &self.system_roles
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub id: Uuid,
    pub name: String,
    pub is_group: bool,
    pub description: Option<String>,
    #[serde(rename = "avatarFileID")]
    pub avatar_file_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_file: Option<FileInfo>,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatView {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            name: chat.name,
            is_group: chat.is_group,
            description: chat.description,
            avatar_file_id: chat.avatar_file_id,
            avatar_file: None,
            created_at: chat.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    #[serde(rename = "chatID")]
    pub chat_id: Uuid,
    #[serde(rename = "senderID")]
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileInfo>>,
}

impl MessageView {
    fn new(message: Message, files: Option<Vec<FileInfo>>) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            content: message.content,
            updated_at: message.updated_at,
            created_at: message.created_at,
            files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionView {
    pub id: i32,
    pub name: String,
}

impl From<ChatPermission> for PermissionView {
    fn from(permission: ChatPermission) -> Self {
        Self {
            id: permission.id,
            name: permission.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleView {
    pub id: i32,
    pub name: String,
    pub permissions: Vec<PermissionView>,
}

impl From<RoleWithPermissions> for RoleView {
    fn from(role: RoleWithPermissions) -> Self {
        Self {
            id: role.id,
            name: role.name,
            permissions: role.permissions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleView {
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRoleView {
    pub role_id: i32,
    pub role_name: String,
    pub permissions: Vec<PermissionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user_id: Uuid,
    pub role_id: i32,
    pub role_name: String,
}

impl From<Member> for MemberView {
    fn from(member: Member) -> Self {
        Self {
            user_id: member.user_id,
            role_id: member.role_id,
            role_name: member.role_name,
        }
    }
}
