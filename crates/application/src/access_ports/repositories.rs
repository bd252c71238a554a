use async_trait::async_trait;
use uuid::Uuid;

use galley_core::AppResult;
use galley_domain::{
    PermissionDefinition, PermissionKey, Role, RolePermissionGrant, RoleSlug, SubjectId,
    UserRoleAssignment,
};

use super::inputs::{CreatePermissionInput, CreateRoleInput, RoleListQuery};

/// Read port over the permission store, consumed by the resolver only.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Returns the roles assigned to a subject whose active flag is set.
    async fn find_active_roles_for_user(&self, subject: &SubjectId) -> AppResult<Vec<Role>>;

    /// Returns the de-duplicated union of permissions granted to any of the roles.
    async fn find_permissions_for_roles(&self, role_ids: &[Uuid])
    -> AppResult<Vec<PermissionKey>>;
}

/// Write port for role, permission and assignment administration.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Lists roles matching the filter, ordered by tenant then slug.
    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>>;

    /// Finds one role by id.
    async fn find_role(&self, role_id: Uuid) -> AppResult<Option<Role>>;

    /// Creates a role. Duplicate `(tenant, slug)` pairs are a conflict.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role>;

    /// Creates or reactivates a global role and returns it.
    async fn ensure_global_role(&self, slug: &RoleSlug, name: &str) -> AppResult<Role>;

    /// Updates the active flag of a role.
    async fn set_role_active(&self, role_id: Uuid, is_active: bool) -> AppResult<Role>;

    /// Deletes a role with its assignments and grants.
    async fn delete_role(&self, role_id: Uuid) -> AppResult<()>;

    /// Lists the permission catalog ordered by resource and action.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Adds a permission. Duplicate pairs are a conflict.
    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition>;

    /// Adds a permission unless the pair already exists.
    async fn ensure_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition>;

    /// Lists the grants attached to a role.
    async fn list_role_permissions(&self, role_id: Uuid) -> AppResult<Vec<RolePermissionGrant>>;

    /// Grants a permission to a role. Granting twice keeps the first grant.
    async fn grant_permission(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()>;

    /// Revokes a permission from a role.
    async fn revoke_permission(&self, role_id: Uuid, permission: &PermissionKey)
    -> AppResult<()>;

    /// Assigns a role to a subject. Assigning twice keeps the first assignment.
    async fn assign_role(
        &self,
        subject: &SubjectId,
        role_id: Uuid,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()>;

    /// Removes a role assignment from a subject.
    async fn unassign_role(&self, subject: &SubjectId, role_id: Uuid) -> AppResult<()>;

    /// Lists the role assignments of a subject, active or not.
    async fn list_user_roles(&self, subject: &SubjectId) -> AppResult<Vec<UserRoleAssignment>>;
}
