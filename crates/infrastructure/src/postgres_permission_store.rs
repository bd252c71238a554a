use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use galley_application::PermissionStore;
use galley_core::AppResult;
use galley_domain::{PermissionKey, Role, SubjectId};

use crate::access_rows::{PermissionKeyRow, RoleRow, decode_granted_keys, decode_rows};
use crate::store_error::map_store_error;

/// PostgreSQL-backed read store used by the permission resolver.
#[derive(Clone)]
pub struct PostgresPermissionStore {
    pool: PgPool,
}

impl PostgresPermissionStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PostgresPermissionStore {
    async fn find_active_roles_for_user(&self, subject: &SubjectId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id,
                roles.tenant_id,
                roles.name,
                roles.slug,
                roles.description,
                roles.is_active,
                roles.created_at,
                roles.updated_at
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.subject = $1
                AND roles.is_active
            ORDER BY roles.slug
            "#,
        )
        .bind(subject.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to load roles for subject"))?;

        decode_rows(rows)
    }

    async fn find_permissions_for_roles(
        &self,
        role_ids: &[Uuid],
    ) -> AppResult<Vec<PermissionKey>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PermissionKeyRow>(
            r#"
            SELECT DISTINCT permissions.resource, permissions.action
            FROM rbac_role_permissions AS role_permissions
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = ANY($1)
            ORDER BY permissions.resource, permissions.action
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to load permissions for roles"))?;

        Ok(decode_granted_keys(rows))
    }
}
