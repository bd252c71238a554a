use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use galley_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PermissionKey, SubjectId};

/// Slug of the role that bypasses every explicit permission check.
pub const SUPER_USER_ROLE_SLUG: &str = "admin";

const SLUG_MAX_LENGTH: usize = 64;

/// Returns whether a role slug designates the super-user role.
///
/// This is the only place the bypass rule is defined.
#[must_use]
pub fn is_role_designated_super_user(slug: &str) -> bool {
    slug == SUPER_USER_ROLE_SLUG
}

/// Machine-facing role name, unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleSlug(String);

impl RoleSlug {
    /// Parses a slug of 1-64 characters from `[a-z0-9_-]`.
    pub fn parse(value: &str) -> AppResult<Self> {
        if value.is_empty() || value.len() > SLUG_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role slug must be between 1 and {SLUG_MAX_LENGTH} characters"
            )));
        }

        if !value.bytes().all(|byte| {
            byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_' || byte == b'-'
        }) {
            return Err(AppError::Validation(format!(
                "role slug '{value}' may only contain lowercase letters, digits, '_' and '-'"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// Returns the super-user role slug.
    #[must_use]
    pub fn super_user() -> Self {
        Self(SUPER_USER_ROLE_SLUG.to_owned())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this slug designates the super-user role.
    #[must_use]
    pub fn is_super_user(&self) -> bool {
        is_role_designated_super_user(self.as_str())
    }
}

impl Borrow<str> for RoleSlug {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for RoleSlug {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<RoleSlug> for String {
    fn from(value: RoleSlug) -> Self {
        value.0
    }
}

impl Display for RoleSlug {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Named, optionally tenant-scoped bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Stable role identifier.
    pub role_id: Uuid,
    /// Owning tenant; `None` marks a global system role.
    pub tenant_id: Option<TenantId>,
    /// Display name.
    pub name: String,
    /// Slug, unique per tenant.
    pub slug: RoleSlug,
    /// Optional description.
    pub description: Option<String>,
    /// Inactive roles grant nothing.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Returns whether this role confers super-user rights when active.
    #[must_use]
    pub fn is_super_user(&self) -> bool {
        self.slug.is_super_user()
    }
}

/// Edge linking a subject to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// Assigned subject.
    pub subject: SubjectId,
    /// Assigned role.
    pub role_id: Uuid,
    /// Role slug, denormalized for listings.
    pub role_slug: RoleSlug,
    /// Granting subject; cleared when that user is deleted.
    pub granted_by: Option<SubjectId>,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
}

/// Edge linking a role to a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGrant {
    /// Granting role.
    pub role_id: Uuid,
    /// Granted permission.
    pub permission: PermissionKey,
    /// Granting subject; cleared when that user is deleted.
    pub granted_by: Option<SubjectId>,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
}
