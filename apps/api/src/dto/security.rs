use galley_domain::{PermissionDefinition, Role, RolePermissionGrant, UserRoleAssignment};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Omitted for global roles.
    pub tenant_id: Option<String>,
}

/// Incoming payload for activating or deactivating a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-status-request.ts"
)]
pub struct UpdateRoleStatusRequest {
    pub is_active: bool,
}

/// Incoming payload for extending the permission catalog.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
}

/// Incoming payload for granting a permission to a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/grant-permission-request.ts"
)]
pub struct GrantPermissionRequest {
    /// `resource:action`.
    pub permission: String,
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

/// Role listing filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListRolesQuery {
    pub tenant_id: Option<String>,
    pub include_global: Option<bool>,
}

/// API representation of an RBAC role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub tenant_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_super_user: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            tenant_id: value.tenant_id.map(|tenant_id| tenant_id.to_string()),
            is_super_user: value.is_super_user(),
            name: value.name,
            slug: value.slug.into(),
            description: value.description,
            is_active: value.is_active,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// API representation of a permission catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub key: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            permission_id: value.permission_id.to_string(),
            key: value.key.to_string(),
            resource: value.key.resource().to_owned(),
            action: value.key.action().to_owned(),
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// API representation of a role's permission grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-permission-response.ts"
)]
pub struct RolePermissionResponse {
    pub role_id: String,
    pub permission: String,
    pub granted_by: Option<String>,
    pub granted_at: String,
}

impl From<RolePermissionGrant> for RolePermissionResponse {
    fn from(value: RolePermissionGrant) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            permission: value.permission.to_string(),
            granted_by: value.granted_by.map(|subject| subject.to_string()),
            granted_at: value.granted_at.to_rfc3339(),
        }
    }
}

/// API representation of a user's role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-role-response.ts"
)]
pub struct UserRoleResponse {
    pub subject: String,
    pub role_id: String,
    pub role_slug: String,
    pub granted_by: Option<String>,
    pub granted_at: String,
}

impl From<UserRoleAssignment> for UserRoleResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            subject: value.subject.to_string(),
            role_id: value.role_id.to_string(),
            role_slug: value.role_slug.into(),
            granted_by: value.granted_by.map(|subject| subject.to_string()),
            granted_at: value.granted_at.to_rfc3339(),
        }
    }
}
