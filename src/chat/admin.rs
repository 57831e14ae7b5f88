use serde::Deserialize;
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::utils::dedup_ordered;

use super::{ChatService, PermissionView, RoleView};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    #[serde(rename = "permissionIds", default)]
    pub permission_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRolePermissionsInput {
    #[serde(rename = "permissionIds")]
    pub permission_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermissionInput {
    pub name: String,
}

fn reference_name(raw: &str, what: &str) -> ServiceResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{what} name must not be empty")));
    }
    Ok(trimmed.to_string())
}

impl ChatService {
    pub fn list_roles(&self) -> ServiceResult<Vec<RoleView>> {
        let roles = self.roles.list_roles()?;
        Ok(roles.into_iter().map(Into::into).collect())
    }

    pub fn get_role(&self, role_id: i32) -> ServiceResult<RoleView> {
        self.roles
            .find_role(role_id)?
            .map(Into::into)
            .ok_or(ServiceError::RoleNotFound(role_id))
    }

    pub fn create_role(&self, input: CreateRoleInput) -> ServiceResult<RoleView> {
        let name = reference_name(&input.name, "role")?;
        let permission_ids = self.known_permissions(&input.permission_ids)?;

        let role = self.roles.create_role(&name, &permission_ids)?;
        info!(role_id = role.id, role = %role.name, "chat role created");
        self.refresh_system_roles()?;
        Ok(role.into())
    }

    pub fn delete_role(&self, role_id: i32) -> ServiceResult<()> {
        if !self.roles.delete_role(role_id)? {
            return Err(ServiceError::RoleNotFound(role_id));
        }
        info!(role_id, "chat role deleted");
        self.refresh_system_roles()
    }

    /// Replaces the permission set of a role.
    pub fn set_role_permissions(
        &self,
        role_id: i32,
        input: UpdateRolePermissionsInput,
    ) -> ServiceResult<RoleView> {
        if self.roles.find_role(role_id)?.is_none() {
            return Err(ServiceError::RoleNotFound(role_id));
        }
        let permission_ids = self.known_permissions(&input.permission_ids)?;

        self.roles.set_role_permissions(role_id, &permission_ids)?;
        info!(role_id, permissions = permission_ids.len(), "chat role permissions replaced");
        self.get_role(role_id)
    }

    pub fn list_permissions(&self) -> ServiceResult<Vec<PermissionView>> {
        let permissions = self.roles.list_permissions()?;
        Ok(permissions.into_iter().map(Into::into).collect())
    }

    pub fn create_permission(&self, input: CreatePermissionInput) -> ServiceResult<PermissionView> {
        let name = reference_name(&input.name, "permission")?;
        let permission = self.roles.create_permission(&name)?;
        info!(permission_id = permission.id, permission = %permission.name, "chat permission created");
        Ok(permission.into())
    }

    pub fn delete_permission(&self, permission_id: i32) -> ServiceResult<()> {
        if !self.roles.delete_permission(permission_id)? {
            return Err(ServiceError::PermissionNotFound(permission_id));
        }
        info!(permission_id, "chat permission deleted");
        Ok(())
    }

    fn known_permissions(&self, permission_ids: &[i32]) -> ServiceResult<Vec<i32>> {
        let permission_ids = dedup_ordered(permission_ids);
        for permission_id in &permission_ids {
            if self.roles.find_permission(*permission_id)?.is_none() {
                return Err(ServiceError::Validation(format!(
                    "unknown permission id {permission_id}"
                )));
            }
        }
        Ok(permission_ids)
    }

    fn refresh_system_roles(&self) -> ServiceResult<()> {
        self.system_roles.refresh(self.roles.as_ref())?;
        Ok(())
    }
}
