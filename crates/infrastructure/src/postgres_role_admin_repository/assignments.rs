use super::*;

impl PostgresRoleAdminRepository {
    pub(super) async fn assign_role_impl(
        &self,
        subject: &SubjectId,
        role_id: Uuid,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        ensure_app_user(&mut transaction, subject).await?;
        if let Some(granted_by) = granted_by {
            ensure_app_user(&mut transaction, granted_by).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (subject, role_id, granted_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (subject, role_id) DO NOTHING
            "#,
        )
        .bind(subject.as_str())
        .bind(role_id)
        .bind(granted_by.map(SubjectId::as_str))
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "failed to assign role",
                || format!("subject '{subject}' already holds role '{role_id}'"),
                || format!("role '{role_id}' does not exist"),
            )
        })?;

        commit(transaction).await
    }

    pub(super) async fn unassign_role_impl(
        &self,
        subject: &SubjectId,
        role_id: Uuid,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE subject = $1 AND role_id = $2
            "#,
        )
        .bind(subject.as_str())
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to remove role assignment"))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "subject '{subject}' does not hold role '{role_id}'"
            )));
        }

        Ok(())
    }

    pub(super) async fn list_user_roles_impl(
        &self,
        subject: &SubjectId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT
                user_roles.subject,
                user_roles.role_id,
                roles.slug AS role_slug,
                user_roles.granted_by,
                user_roles.granted_at
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.subject = $1
            ORDER BY roles.slug
            "#,
        )
        .bind(subject.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_store_error(error, "failed to list user roles"))?;

        decode_rows(rows)
    }
}
