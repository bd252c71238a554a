use galley_core::TenantId;
use galley_domain::{PermissionKey, RoleSlug};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Owning tenant; `None` creates a global role.
    pub tenant_id: Option<TenantId>,
    /// Display name.
    pub name: String,
    /// Slug, unique per tenant.
    pub slug: RoleSlug,
    /// Optional description.
    pub description: Option<String>,
}

/// Input payload for extending the permission catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Resource/action pair.
    pub key: PermissionKey,
    /// Optional human description.
    pub description: Option<String>,
}

/// Filter for role listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleListQuery {
    /// Restricts tenant roles to one tenant. `None` lists every tenant.
    pub tenant_id: Option<TenantId>,
    /// Includes global roles next to tenant roles.
    pub include_global: bool,
}
