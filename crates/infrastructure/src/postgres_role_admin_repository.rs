use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use galley_application::{
    CreatePermissionInput, CreateRoleInput, RoleAdminRepository, RoleListQuery,
};
use galley_core::{AppError, AppResult};
use galley_domain::{
    PermissionDefinition, PermissionKey, Role, RolePermissionGrant, RoleSlug, SubjectId,
    UserRoleAssignment,
};

use crate::access_rows::{PermissionRow, RoleGrantRow, RoleRow, UserRoleRow, decode_rows};
use crate::store_error::{map_store_error, map_write_error};

mod assignments;
mod permissions;
mod roles;

/// PostgreSQL-backed repository for role, permission and assignment administration.
#[derive(Clone)]
pub struct PostgresRoleAdminRepository {
    pool: PgPool,
}

impl PostgresRoleAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| map_store_error(error, "failed to begin transaction"))
    }
}

#[async_trait]
impl RoleAdminRepository for PostgresRoleAdminRepository {
    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        self.list_roles_impl(query).await
    }

    async fn find_role(&self, role_id: Uuid) -> AppResult<Option<Role>> {
        self.find_role_impl(role_id).await
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        self.create_role_impl(input).await
    }

    async fn ensure_global_role(&self, slug: &RoleSlug, name: &str) -> AppResult<Role> {
        self.ensure_global_role_impl(slug, name).await
    }

    async fn set_role_active(&self, role_id: Uuid, is_active: bool) -> AppResult<Role> {
        self.set_role_active_impl(role_id, is_active).await
    }

    async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        self.delete_role_impl(role_id).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_impl().await
    }

    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        self.create_permission_impl(input).await
    }

    async fn ensure_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        self.ensure_permission_impl(input).await
    }

    async fn list_role_permissions(&self, role_id: Uuid) -> AppResult<Vec<RolePermissionGrant>> {
        self.list_role_permissions_impl(role_id).await
    }

    async fn grant_permission(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()> {
        self.grant_permission_impl(role_id, permission, granted_by)
            .await
    }

    async fn revoke_permission(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
    ) -> AppResult<()> {
        self.revoke_permission_impl(role_id, permission).await
    }

    async fn assign_role(
        &self,
        subject: &SubjectId,
        role_id: Uuid,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()> {
        self.assign_role_impl(subject, role_id, granted_by).await
    }

    async fn unassign_role(&self, subject: &SubjectId, role_id: Uuid) -> AppResult<()> {
        self.unassign_role_impl(subject, role_id).await
    }

    async fn list_user_roles(&self, subject: &SubjectId) -> AppResult<Vec<UserRoleAssignment>> {
        self.list_user_roles_impl(subject).await
    }
}

/// Registers a subject so it can be referenced by assignment and grant rows.
async fn ensure_app_user(
    transaction: &mut Transaction<'_, Postgres>,
    subject: &SubjectId,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO app_users (subject)
        VALUES ($1)
        ON CONFLICT (subject) DO NOTHING
        "#,
    )
    .bind(subject.as_str())
    .execute(&mut **transaction)
    .await
    .map_err(|error| map_store_error(error, "failed to register user"))?;

    Ok(())
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| map_store_error(error, "failed to commit transaction"))
}
