use std::collections::HashSet;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::{self, FileInfo};
use crate::models::{Chat, ChatUser, NewChat};
use crate::notify::{creator_name, NotificationPayload};
use crate::roles::SystemRole;
use crate::utils::dedup_ordered;

use super::{ChatService, ChatView, MemberView, MyRoleView, UserRoleView, CHAT_ADMINISTRATOR};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "avatarFileID", default)]
    pub avatar_file_id: Option<i32>,
    #[serde(rename = "ownerID")]
    pub owner_id: Uuid,
    #[serde(rename = "userIDs", default)]
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChatInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "avatarFileID", default)]
    pub avatar_file_id: Option<i32>,
    #[serde(rename = "addUserIDs", default)]
    pub add_user_ids: Vec<Uuid>,
    #[serde(rename = "removeUserIDs", default)]
    pub remove_user_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipChange {
    Created,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateUser {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub state: MembershipChange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChatOutput {
    pub chat: ChatView,
    pub update_users: Vec<UpdateUser>,
}

fn chat_name(raw: &str) -> ServiceResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("chat name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

impl ChatService {
    /// Creates a chat owned by `owner_id` with every listed user as a member.
    ///
    /// The owner and all members are resolved before anything is written; the
    /// chat and its memberships are then stored together.
    pub async fn create_chat(&self, input: CreateChatInput) -> ServiceResult<Uuid> {
        let owner_role = self
            .system_roles
            .id(SystemRole::Owner)
            .ok_or(ServiceError::InvalidCredentials)?;
        let main_role = self
            .system_roles
            .id(SystemRole::Main)
            .ok_or(ServiceError::InvalidCredentials)?;

        let name = chat_name(&input.name)?;
        let avatar_file_id = match input.avatar_file_id {
            Some(file_id) => Some(gateway::require_file(self.gateway.as_ref(), file_id).await?.id),
            None => None,
        };
        let is_group = input.user_ids.len() > 1;

        let owner = gateway::require_user(self.gateway.as_ref(), input.owner_id).await?;

        let chat_id = Uuid::new_v4();
        let mut seen = HashSet::from([owner.id]);
        let mut memberships = vec![ChatUser {
            chat_id,
            user_id: owner.id,
            role_id: owner_role,
        }];
        let mut invited = Vec::with_capacity(input.user_ids.len());
        for user_id in &input.user_ids {
            let user = gateway::require_user(self.gateway.as_ref(), *user_id).await?;
            if seen.insert(user.id) {
                memberships.push(ChatUser {
                    chat_id,
                    user_id: user.id,
                    role_id: main_role,
                });
                invited.push(user);
            }
        }

        let chat = NewChat {
            id: chat_id,
            name,
            is_group,
            description: input.description,
            avatar_file_id,
        };
        self.memberships.create_chat(&chat, &memberships)?;
        info!(%chat_id, owner_id = %owner.id, members = memberships.len(), "chat created");

        let creator = creator_name(&owner.username);
        for user in &invited {
            self.notifier
                .dispatch(
                    &user.email,
                    NotificationPayload::NewChat {
                        chat_id,
                        chat_name: chat.name.clone(),
                        creator_name: creator.clone(),
                        is_group,
                        description: chat.description.clone(),
                    },
                )
                .await;
        }

        Ok(chat_id)
    }

    pub async fn update_chat(
        &self,
        chat_id: Uuid,
        input: UpdateChatInput,
    ) -> ServiceResult<UpdateChatOutput> {
        let mut chat = self
            .memberships
            .find_chat(chat_id)?
            .ok_or_else(|| ServiceError::Database(format!("chat not found: {chat_id}")))?;

        if let Some(name) = input.name.as_deref() {
            chat.name = chat_name(name)?;
        }
        if let Some(description) = input.description {
            chat.description = Some(description);
        }
        if let Some(file_id) = input.avatar_file_id {
            chat.avatar_file_id =
                Some(gateway::require_file(self.gateway.as_ref(), file_id).await?.id);
        }

        let mut added = Vec::new();
        let mut invited = Vec::new();
        if !input.add_user_ids.is_empty() {
            let main_role = self
                .system_roles
                .id(SystemRole::Main)
                .ok_or(ServiceError::InvalidCredentials)?;
            for user_id in dedup_ordered(&input.add_user_ids) {
                let user = gateway::require_user(self.gateway.as_ref(), user_id).await?;
                added.push(ChatUser {
                    chat_id,
                    user_id: user.id,
                    role_id: main_role,
                });
                invited.push(user);
            }
        }
        let removed = dedup_ordered(&input.remove_user_ids);

        self.memberships.update_chat(&chat, &added, &removed)?;
        info!(
            %chat_id,
            added = added.len(),
            removed = removed.len(),
            "chat updated"
        );

        for user in &invited {
            self.notifier
                .dispatch(
                    &user.email,
                    NotificationPayload::NewChat {
                        chat_id,
                        chat_name: chat.name.clone(),
                        creator_name: CHAT_ADMINISTRATOR.to_string(),
                        is_group: chat.is_group,
                        description: chat.description.clone(),
                    },
                )
                .await;
        }

        let update_users = added
            .iter()
            .map(|member| UpdateUser {
                user_id: member.user_id,
                state: MembershipChange::Created,
            })
            .chain(removed.iter().map(|user_id| UpdateUser {
                user_id: *user_id,
                state: MembershipChange::Deleted,
            }))
            .collect();

        Ok(UpdateChatOutput {
            chat: chat.into(),
            update_users,
        })
    }

    pub fn delete_chat(&self, chat_id: Uuid) -> ServiceResult<()> {
        self.memberships.delete_chat(chat_id)?;
        info!(%chat_id, "chat deleted");
        Ok(())
    }

    /// A missing membership and a failed lookup are reported alike.
    pub fn change_user_role(&self, chat_id: Uuid, user_id: Uuid, role_id: i32) -> ServiceResult<()> {
        self.require_member(chat_id, user_id)?;
        match self.roles.find_role(role_id) {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => return Err(ServiceError::InvalidCredentials),
        }
        self.assign_role(chat_id, user_id, role_id)
    }

    pub fn ban_user(&self, chat_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.require_member(chat_id, user_id)?;
        let banned = self
            .system_roles
            .id(SystemRole::Banned)
            .ok_or_else(|| ServiceError::Internal("banned role is not configured".into()))?;
        self.assign_role(chat_id, user_id, banned)?;
        info!(%chat_id, %user_id, "user banned");
        Ok(())
    }

    fn require_member(&self, chat_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        match self.memberships.find_membership(chat_id, user_id) {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(ServiceError::InvalidCredentials),
            Err(err) => {
                warn!(%chat_id, %user_id, error = %err, "membership lookup failed");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    fn assign_role(&self, chat_id: Uuid, user_id: Uuid, role_id: i32) -> ServiceResult<()> {
        if !self.memberships.set_member_role(chat_id, user_id, role_id)? {
            return Err(ServiceError::InvalidCredentials);
        }
        Ok(())
    }

    pub fn user_role_in_chat(
        &self,
        chat_id: Uuid,
        user_id: Uuid,
        requester_id: Uuid,
    ) -> ServiceResult<UserRoleView> {
        if self
            .memberships
            .find_membership(chat_id, requester_id)?
            .is_none()
        {
            return Err(ServiceError::NotChatMember);
        }

        let membership = self
            .memberships
            .find_membership(chat_id, user_id)?
            .ok_or(ServiceError::UserNotInChat)?;
        Ok(UserRoleView {
            role_name: membership.role.name,
        })
    }

    pub fn my_role(&self, chat_id: Uuid, user_id: Uuid) -> ServiceResult<MyRoleView> {
        let membership = self
            .memberships
            .find_membership(chat_id, user_id)?
            .ok_or(ServiceError::UserNotInChat)?;
        Ok(MyRoleView {
            role_id: membership.role.id,
            role_name: membership.role.name,
            permissions: membership
                .role
                .permissions
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    }

    pub fn members(&self, chat_id: Uuid) -> ServiceResult<Vec<MemberView>> {
        let members = self.memberships.list_members(chat_id)?;
        Ok(members.into_iter().map(Into::into).collect())
    }

    pub async fn get_chat(&self, chat_id: Uuid) -> ServiceResult<ChatView> {
        let chat = self
            .memberships
            .find_chat(chat_id)?
            .ok_or(ServiceError::ChatNotFound)?;
        Ok(self.with_avatar(chat).await)
    }

    pub async fn user_chats(&self, user_id: Uuid) -> ServiceResult<Vec<ChatView>> {
        let chats = self.memberships.list_user_chats(user_id)?;
        Ok(join_all(chats.into_iter().map(|chat| self.with_avatar(chat))).await)
    }

    /// Attaches the avatar file when it resolves; lookup failures only log.
    async fn with_avatar(&self, chat: Chat) -> ChatView {
        let avatar_file_id = chat.avatar_file_id;
        let mut view = ChatView::from(chat);
        if let Some(file_id) = avatar_file_id {
            match self.gateway.file(file_id).await {
                Ok(file) if file.id > 0 => view.avatar_file = Some(file),
                Ok(FileInfo { id, .. }) => {
                    warn!(chat_id = %view.id, file_id, resolved_id = id, "avatar file missing")
                }
                Err(err) => {
                    warn!(chat_id = %view.id, file_id, error = %err, "failed to resolve avatar")
                }
            }
        }
        view
    }
}
