use super::*;

impl PostgresRoleAdminRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, resource, action, description, created_at
            FROM rbac_permissions
            ORDER BY resource, action
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to list permissions"))?;

        decode_rows(rows)
    }

    pub(super) async fn create_permission_impl(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO rbac_permissions (resource, action, description)
            VALUES ($1, $2, $3)
            RETURNING id, resource, action, description, created_at
            "#,
        )
        .bind(input.key.resource())
        .bind(input.key.action())
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "failed to create permission",
                || format!("permission '{}' already exists", input.key),
                || format!("permission '{}' could not be created", input.key),
            )
        })?;

        PermissionDefinition::try_from(row)
    }

    pub(super) async fn ensure_permission_impl(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO rbac_permissions (resource, action, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (resource, action) DO UPDATE
            SET description = COALESCE(rbac_permissions.description, EXCLUDED.description)
            RETURNING id, resource, action, description, created_at
            "#,
        )
        .bind(input.key.resource())
        .bind(input.key.action())
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to ensure permission"))?;

        PermissionDefinition::try_from(row)
    }

    pub(super) async fn list_role_permissions_impl(
        &self,
        role_id: Uuid,
    ) -> AppResult<Vec<RolePermissionGrant>> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            r#"
            SELECT
                role_permissions.role_id,
                permissions.resource,
                permissions.action,
                role_permissions.granted_by,
                role_permissions.granted_at
            FROM rbac_role_permissions AS role_permissions
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.resource, permissions.action
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to list role permissions"))?;

        decode_rows(rows)
    }

    pub(super) async fn grant_permission_impl(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let permission_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM rbac_permissions
            WHERE resource = $1 AND action = $2
            "#,
        )
        .bind(permission.resource())
        .bind(permission.action())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| map_store_error(error, "failed to resolve permission"))?
        .ok_or_else(|| AppError::NotFound(format!("permission '{permission}' does not exist")))?;

        if let Some(granted_by) = granted_by {
            ensure_app_user(&mut transaction, granted_by).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id, granted_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_id)
        .bind(granted_by.map(SubjectId::as_str))
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "failed to grant permission",
                || format!("permission '{permission}' is already granted to role '{role_id}'"),
                || format!("role '{role_id}' does not exist"),
            )
        })?;

        commit(transaction).await
    }

    pub(super) async fn revoke_permission_impl(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_role_permissions AS role_permissions
            USING rbac_permissions AS permissions
            WHERE role_permissions.permission_id = permissions.id
                AND role_permissions.role_id = $1
                AND permissions.resource = $2
                AND permissions.action = $3
            "#,
        )
        .bind(role_id)
        .bind(permission.resource())
        .bind(permission.action())
        .execute(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to revoke permission"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission}' is not granted to role '{role_id}'"
            )));
        }

        Ok(())
    }
}
