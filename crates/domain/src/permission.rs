use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use galley_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SEGMENT_MAX_LENGTH: usize = 64;

/// Atomic capability expressed as a `(resource, action)` pair.
///
/// The vocabulary is open: new pairs are introduced by seeding the store,
/// not by adding variants. The textual form is `resource:action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey {
    resource: String,
    action: String,
}

impl PermissionKey {
    /// Creates a validated permission key.
    ///
    /// Both segments must be 1-64 characters of `[a-z0-9_]`.
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> AppResult<Self> {
        let resource = resource.into();
        let action = action.into();
        validate_segment("resource", resource.as_str())?;
        validate_segment("action", action.as_str())?;

        Ok(Self { resource, action })
    }

    /// Returns the resource segment, e.g. `purchase_order`.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the action segment, e.g. `approve`.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns whether this key names the given resource and action.
    #[must_use]
    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((resource, action)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "permission '{value}' must have the form 'resource:action'"
            )));
        };

        Self::new(resource, action)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.to_string()
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource, self.action)
    }
}

fn validate_segment(label: &str, value: &str) -> AppResult<()> {
    if value.is_empty() || value.len() > SEGMENT_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "permission {label} must be between 1 and {SEGMENT_MAX_LENGTH} characters"
        )));
    }

    if !value
        .bytes()
        .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
    {
        return Err(AppError::Validation(format!(
            "permission {label} '{value}' may only contain lowercase letters, digits and '_'"
        )));
    }

    Ok(())
}

/// Persisted permission definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDefinition {
    /// Stable permission identifier.
    pub permission_id: Uuid,
    /// Resource/action pair, unique system-wide.
    pub key: PermissionKey,
    /// Optional human description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Permissions the access-control administration routes are guarded by.
///
/// These are seeded at bootstrap. ERP modules seed their own pairs
/// (`purchase_order:approve`, `location:manage`, ...) without touching this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinPermission {
    /// Allows listing roles.
    RoleRead,
    /// Allows creating roles, changing their status and their grants.
    RoleManage,
    /// Allows listing the permission catalog.
    PermissionRead,
    /// Allows extending the permission catalog.
    PermissionManage,
    /// Allows listing role assignments of users.
    UserRoleRead,
    /// Allows assigning and removing user roles.
    UserRoleManage,
}

impl BuiltinPermission {
    /// Returns all built-in permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[BuiltinPermission] = &[
            BuiltinPermission::RoleRead,
            BuiltinPermission::RoleManage,
            BuiltinPermission::PermissionRead,
            BuiltinPermission::PermissionManage,
            BuiltinPermission::UserRoleRead,
            BuiltinPermission::UserRoleManage,
        ];

        ALL
    }

    /// Returns the `(resource, action)` storage pair.
    #[must_use]
    pub fn as_pair(&self) -> (&'static str, &'static str) {
        match self {
            Self::RoleRead => ("role", "read"),
            Self::RoleManage => ("role", "manage"),
            Self::PermissionRead => ("permission", "read"),
            Self::PermissionManage => ("permission", "manage"),
            Self::UserRoleRead => ("user_role", "read"),
            Self::UserRoleManage => ("user_role", "manage"),
        }
    }

    /// Returns the seeded description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::RoleRead => "List roles",
            Self::RoleManage => "Create roles, toggle them and edit their grants",
            Self::PermissionRead => "List the permission catalog",
            Self::PermissionManage => "Extend the permission catalog",
            Self::UserRoleRead => "List role assignments of users",
            Self::UserRoleManage => "Assign and remove user roles",
        }
    }

    /// Returns the permission key for this built-in.
    #[must_use]
    pub fn key(&self) -> PermissionKey {
        let (resource, action) = self.as_pair();
        PermissionKey {
            resource: resource.to_owned(),
            action: action.to_owned(),
        }
    }
}
