use galley_core::{AppResult, UserIdentity};
use galley_domain::{PermissionDefinition, PermissionKey, RolePermissionGrant};
use tracing::info;
use uuid::Uuid;

use crate::access_ports::CreatePermissionInput;

use super::{RoleAdminService, actor_subject};

impl RoleAdminService {
    /// Lists the permission catalog.
    pub async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.repository.list_permissions().await
    }

    /// Adds a `(resource, action)` pair to the catalog.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let permission = self.repository.create_permission(input).await?;
        info!(
            actor = actor.subject(),
            permission = %permission.key,
            "permission created"
        );

        Ok(permission)
    }

    /// Lists the grants of a role.
    pub async fn list_role_permissions(
        &self,
        role_id: Uuid,
    ) -> AppResult<Vec<RolePermissionGrant>> {
        self.get_role(role_id).await?;
        self.repository.list_role_permissions(role_id).await
    }

    /// Grants a permission to a role and invalidates every cached set.
    ///
    /// The role may be held by any number of subjects, so the whole cache goes.
    pub async fn grant_permission(
        &self,
        actor: &UserIdentity,
        role_id: Uuid,
        permission: &PermissionKey,
    ) -> AppResult<()> {
        let granted_by = actor_subject(actor)?;
        self.repository
            .grant_permission(role_id, permission, Some(&granted_by))
            .await?;
        self.resolver.invalidate_all().await;
        info!(
            actor = actor.subject(),
            role_id = %role_id,
            permission = %permission,
            "permission granted to role"
        );

        Ok(())
    }

    /// Revokes a permission from a role and invalidates every cached set.
    pub async fn revoke_permission(
        &self,
        actor: &UserIdentity,
        role_id: Uuid,
        permission: &PermissionKey,
    ) -> AppResult<()> {
        self.repository.revoke_permission(role_id, permission).await?;
        self.resolver.invalidate_all().await;
        info!(
            actor = actor.subject(),
            role_id = %role_id,
            permission = %permission,
            "permission revoked from role"
        );

        Ok(())
    }
}
