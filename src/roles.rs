use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::store::{RoleStore, StoreResult};

/// The closed set of roles the chat service assigns on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemRole {
    Owner,
    Main,
    Banned,
}

impl SystemRole {
    pub const ALL: [SystemRole; 3] = [SystemRole::Owner, SystemRole::Main, SystemRole::Banned];

    pub fn name(self) -> &'static str {
        match self {
            SystemRole::Owner => "owner",
            SystemRole::Main => "main",
            SystemRole::Banned => "banned",
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role ids of the system roles, read from the role store.
///
/// Loaded once at startup and reloaded whenever roles are administered, so
/// orchestration code never looks roles up by name.
#[derive(Debug, Default)]
pub struct SystemRoles {
    ids: RwLock<HashMap<SystemRole, i32>>,
}

impl SystemRoles {
    pub fn load(store: &dyn RoleStore) -> StoreResult<Self> {
        let roles = Self::default();
        roles.refresh(store)?;
        Ok(roles)
    }

    pub fn refresh(&self, store: &dyn RoleStore) -> StoreResult<()> {
        let mut ids = HashMap::new();
        for role in SystemRole::ALL {
            match store.find_role_by_name(role.name())? {
                Some(found) => {
                    ids.insert(role, found.id);
                }
                None => tracing::warn!(role = %role, "system role missing from role store"),
            }
        }

        *self.ids.write().unwrap_or_else(PoisonError::into_inner) = ids;
        Ok(())
    }

    pub fn id(&self, role: SystemRole) -> Option<i32> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .copied()
    }
}
