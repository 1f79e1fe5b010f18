//! User domain model.
//!
//! Represents one managed user record, the attributes needed to create one
//! and a partial update.

use crate::collection::{CsvRecord, Record};
use crate::error::{Result, RosterError};
use crate::role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Active, UserStatus::Inactive, UserStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "pending" => Ok(UserStatus::Pending),
            other => Err(RosterError::validation(format!(
                "unknown user status '{}'",
                other
            ))),
        }
    }
}

/// A managed user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier assigned by the service (e.g. "user-12")
    pub id: String,
    pub name: String,
    pub email: String,
    /// Role id, see [`crate::role`]
    pub role: String,
    pub status: UserStatus,
    pub department: String,
    pub date_joined: NaiveDate,
    pub last_login: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Builds a stored user from a draft and an assigned id.
    pub fn from_draft(id: impl Into<String>, draft: NewUser) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            email: draft.email,
            role: draft.role,
            status: draft.status,
            department: draft.department,
            date_joined: draft.date_joined,
            last_login: draft.last_login,
            avatar: draft.avatar,
        }
    }
}

/// Attributes of a user to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,
    pub department: String,
    pub date_joined: NaiveDate,
    pub last_login: NaiveDate,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Partial update of a user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
    pub department: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub last_login: Option<NaiveDate>,
    pub avatar: Option<String>,
}

impl UserPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies this patch to a user in place.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(department) = &self.department {
            user.department = department.clone();
        }
        if let Some(date_joined) = self.date_joined {
            user.date_joined = date_joined;
        }
        if let Some(last_login) = self.last_login {
            user.last_login = last_login;
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = Some(avatar.clone());
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RosterError::validation("name must not be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(RosterError::validation(format!(
            "'{}' is not a valid email address",
            email
        ))),
    }
}

fn validate_role(role_id: &str) -> Result<()> {
    if role::find(role_id).is_none() {
        return Err(RosterError::validation(format!("unknown role '{}'", role_id)));
    }
    Ok(())
}

impl Record for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const ENTITY: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }

    fn patched(&self, patch: &UserPatch) -> Self {
        let mut user = self.clone();
        patch.apply_to(&mut user);
        user
    }

    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "id" => self.id.clone(),
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "role" => self.role.clone(),
            "status" => self.status.to_string(),
            "department" => self.department.clone(),
            "dateJoined" | "date_joined" => self.date_joined.to_string(),
            "lastLogin" | "last_login" => self.last_login.to_string(),
            "avatar" => self.avatar.clone()?,
            _ => return None,
        };
        Some(value)
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "email"]
    }

    fn validate_draft(draft: &NewUser) -> Result<()> {
        validate_name(&draft.name)?;
        validate_email(&draft.email)?;
        validate_role(&draft.role)
    }

    fn validate_patch(patch: &UserPatch) -> Result<()> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        if let Some(role) = &patch.role {
            validate_role(role)?;
        }
        Ok(())
    }
}

impl CsvRecord for User {
    fn csv_header() -> &'static [&'static str] {
        &[
            "ID",
            "Name",
            "Email",
            "Role",
            "Status",
            "Department",
            "Date Joined",
            "Last Login",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.role.clone(),
            self.status.to_string(),
            self.department.clone(),
            self.date_joined.to_string(),
            self.last_login.to_string(),
        ]
    }
}
