use galley_core::{AppResult, UserIdentity};
use galley_domain::{SubjectId, UserRoleAssignment};
use tracing::info;
use uuid::Uuid;

use super::{RoleAdminService, actor_subject};

impl RoleAdminService {
    /// Lists the role assignments of a subject.
    pub async fn list_user_roles(
        &self,
        subject: &SubjectId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        self.repository.list_user_roles(subject).await
    }

    /// Assigns a role to a subject and invalidates that subject.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        subject: &SubjectId,
        role_id: Uuid,
    ) -> AppResult<()> {
        let granted_by = actor_subject(actor)?;
        self.repository
            .assign_role(subject, role_id, Some(&granted_by))
            .await?;
        self.resolver.invalidate(subject).await;
        info!(
            actor = actor.subject(),
            subject = %subject,
            role_id = %role_id,
            "role assigned"
        );

        Ok(())
    }

    /// Removes a role from a subject and invalidates that subject.
    pub async fn unassign_role(
        &self,
        actor: &UserIdentity,
        subject: &SubjectId,
        role_id: Uuid,
    ) -> AppResult<()> {
        self.repository.unassign_role(subject, role_id).await?;
        self.resolver.invalidate(subject).await;
        info!(
            actor = actor.subject(),
            subject = %subject,
            role_id = %role_id,
            "role unassigned"
        );

        Ok(())
    }
}
