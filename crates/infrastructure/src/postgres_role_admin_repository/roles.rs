use super::*;

impl PostgresRoleAdminRepository {
    pub(super) async fn list_roles_impl(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, tenant_id, name, slug, description, is_active, created_at, updated_at
            FROM rbac_roles
            WHERE (tenant_id IS NULL AND $2)
                OR (tenant_id IS NOT NULL AND ($1::uuid IS NULL OR tenant_id = $1))
            ORDER BY tenant_id NULLS FIRST, slug
            "#,
        )
        .bind(query.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .bind(query.include_global)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to list roles"))?;

        decode_rows(rows)
    }

    pub(super) async fn find_role_impl(&self, role_id: Uuid) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, tenant_id, name, slug, description, is_active, created_at, updated_at
            FROM rbac_roles
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to find role"))?
        .map(Role::try_from)
        .transpose()
    }

    pub(super) async fn create_role_impl(&self, input: CreateRoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO rbac_roles (tenant_id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tenant_id, name, slug, description, is_active, created_at, updated_at
            "#,
        )
        .bind(input.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .bind(input.name.trim())
        .bind(input.slug.as_str())
        .bind(input.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "failed to create role",
                || format!("role '{}' already exists", input.slug),
                || match input.tenant_id {
                    Some(tenant_id) => format!("tenant '{tenant_id}' does not exist"),
                    None => "referenced tenant does not exist".to_owned(),
                },
            )
        })?;

        Role::try_from(row)
    }

    pub(super) async fn ensure_global_role_impl(
        &self,
        slug: &RoleSlug,
        name: &str,
    ) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO rbac_roles (tenant_id, name, slug)
            VALUES (NULL, $1, $2)
            ON CONFLICT (slug) WHERE tenant_id IS NULL DO UPDATE
            SET is_active = true,
                updated_at = CASE
                    WHEN rbac_roles.is_active THEN rbac_roles.updated_at
                    ELSE now()
                END
            RETURNING id, tenant_id, name, slug, description, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to ensure global role"))?;

        Role::try_from(row)
    }

    pub(super) async fn set_role_active_impl(
        &self,
        role_id: Uuid,
        is_active: bool,
    ) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE rbac_roles
            SET is_active = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING id, tenant_id, name, slug, description, is_active, created_at, updated_at
            "#,
        )
        .bind(role_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to update role status"))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        Role::try_from(row)
    }

    pub(super) async fn delete_role_impl(&self, role_id: Uuid) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_roles
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to delete role"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        Ok(())
    }
}
