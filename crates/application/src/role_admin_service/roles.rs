use galley_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use galley_domain::Role;
use tracing::info;
use uuid::Uuid;

use crate::access_ports::{CreateRoleInput, RoleListQuery};

use super::RoleAdminService;

impl RoleAdminService {
    /// Lists roles matching the filter.
    pub async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        self.repository.list_roles(query).await
    }

    /// Returns one role or `NotFound`.
    pub async fn get_role(&self, role_id: Uuid) -> AppResult<Role> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    /// Creates a role. New roles hold no permissions, so no cache entry changes.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        let name = NonEmptyString::new(input.name.trim())?;
        let input = CreateRoleInput {
            name: name.into(),
            ..input
        };

        let role = self.repository.create_role(input).await?;
        info!(
            actor = actor.subject(),
            role_id = %role.role_id,
            slug = %role.slug,
            "role created"
        );

        Ok(role)
    }

    /// Activates or deactivates a role and invalidates every cached set.
    pub async fn set_role_active(
        &self,
        actor: &UserIdentity,
        role_id: Uuid,
        is_active: bool,
    ) -> AppResult<Role> {
        let role = self.repository.set_role_active(role_id, is_active).await?;
        self.resolver.invalidate_all().await;
        info!(
            actor = actor.subject(),
            role_id = %role_id,
            is_active,
            "role status changed"
        );

        Ok(role)
    }

    /// Deletes a role and invalidates every cached set.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: Uuid) -> AppResult<()> {
        self.repository.delete_role(role_id).await?;
        self.resolver.invalidate_all().await;
        info!(actor = actor.subject(), role_id = %role_id, "role deleted");
        Ok(())
    }
}
