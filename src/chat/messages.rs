use std::collections::HashMap;

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::gateway;
use crate::models::NewMessage;
use crate::paging::{Page, MAX_SEARCH_LIMIT};
use crate::utils::dedup_ordered;

use super::{ChatService, MessageView};

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageInput {
    pub content: String,
    #[serde(rename = "fileIDs", default)]
    pub file_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub messages: Vec<MessageView>,
    pub total: i64,
}

impl ChatService {
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        chat_id: Uuid,
        input: SendMessageInput,
    ) -> ServiceResult<MessageView> {
        if self.memberships.find_chat(chat_id)?.is_none() {
            return Err(ServiceError::InvalidCredentials);
        }

        let sender = gateway::require_user(self.gateway.as_ref(), sender_id).await?;
        let file_ids = dedup_ordered(&input.file_ids);
        let files = gateway::require_files(self.gateway.as_ref(), &file_ids).await?;

        let message = NewMessage {
            id: Uuid::new_v4(),
            chat_id,
            sender_id: Some(sender.id),
            content: input.content,
        };
        let stored = self.messages.create_message(&message, &file_ids)?;
        info!(message_id = %message.id, %chat_id, files = file_ids.len(), "message sent");

        let mut by_id: HashMap<i32, _> = file_ids.iter().copied().zip(files).collect();
        let attached = stored
            .file_ids
            .iter()
            .filter_map(|file_id| by_id.remove(file_id))
            .collect();
        Ok(MessageView::new(stored.message, Some(attached)))
    }

    /// Newest first, with every attached file resolved. One failed file
    /// lookup fails the whole page.
    pub async fn chat_messages(&self, chat_id: Uuid, page: Page) -> ServiceResult<Vec<MessageView>> {
        if self.memberships.find_chat(chat_id)?.is_none() {
            return Err(ServiceError::InvalidCredentials);
        }

        let messages = self.messages.chat_messages(chat_id, page)?;
        let resolved = try_join_all(
            messages
                .iter()
                .map(|entry| gateway::require_files(self.gateway.as_ref(), &entry.file_ids)),
        )
        .await?;

        Ok(messages
            .into_iter()
            .zip(resolved)
            .map(|(entry, files)| MessageView::new(entry.message, Some(files)))
            .collect())
    }

    /// Case-insensitive substring search within one chat, restricted to its
    /// members. An empty query is rejected before the store is touched.
    pub fn search_messages(
        &self,
        user_id: Uuid,
        chat_id: Uuid,
        query: &str,
        page: Page,
    ) -> ServiceResult<SearchResult> {
        if query.is_empty() {
            return Err(ServiceError::EmptyQuery);
        }

        if self.memberships.find_chat(chat_id)?.is_none() {
            return Err(ServiceError::ChatNotFound);
        }
        if self.memberships.find_membership(chat_id, user_id)?.is_none() {
            return Err(ServiceError::NotChatMember);
        }

        let page = Page {
            limit: page.limit.min(MAX_SEARCH_LIMIT),
            offset: page.offset,
        };
        let (messages, total) = self.messages.search_messages(chat_id, query, page)?;
        Ok(SearchResult {
            messages: messages
                .into_iter()
                .map(|message| MessageView::new(message, None))
                .collect(),
            total,
        })
    }
}
