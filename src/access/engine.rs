use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::store::MembershipStore;

/// Answers whether a chat member holds a permission.
///
/// Membership is re-read on every call. A missing membership is reported as
/// [`ServiceError::NotChatMember`] and a failed lookup as
/// [`ServiceError::Database`]; neither is conflated with `Ok(false)`.
#[derive(Clone)]
pub struct PermissionEngine {
    memberships: Arc<dyn MembershipStore>,
}

impl PermissionEngine {
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self { memberships }
    }

    pub fn has_permission(
        &self,
        user_id: Uuid,
        chat_id: Uuid,
        permission: &str,
    ) -> ServiceResult<bool> {
        match self.memberships.find_membership(chat_id, user_id) {
            Ok(Some(membership)) => Ok(membership.role.grants(permission)),
            Ok(None) => Err(ServiceError::NotChatMember),
            Err(err) => Err(ServiceError::Database(err.to_string())),
        }
    }
}
