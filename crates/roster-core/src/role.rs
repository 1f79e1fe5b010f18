//! Role catalog.
//!
//! Users reference a role by id. The catalog is static: three roles with a
//! fixed permission list each.

use serde::{Deserialize, Serialize};

/// A permission granted by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Delete,
    LimitedDelete,
    ManageUsers,
}

/// A role and the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: &'static str,
    pub name: &'static str,
    pub permissions: &'static [Permission],
}

impl Role {
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

pub const ADMIN: Role = Role {
    id: "admin",
    name: "Administrator",
    permissions: &[
        Permission::Read,
        Permission::Write,
        Permission::Delete,
        Permission::ManageUsers,
    ],
};

pub const MANAGER: Role = Role {
    id: "manager",
    name: "Manager",
    permissions: &[Permission::Read, Permission::Write, Permission::LimitedDelete],
};

pub const VIEWER: Role = Role {
    id: "viewer",
    name: "Viewer",
    permissions: &[Permission::Read],
};

/// Every known role.
pub static ROLES: [Role; 3] = [ADMIN, MANAGER, VIEWER];

/// Looks up a role by id.
pub fn find(id: &str) -> Option<&'static Role> {
    ROLES.iter().find(|role| role.id == id)
}
