use std::sync::Arc;

use galley_core::AppResult;
use galley_domain::{BuiltinPermission, RoleSlug, SubjectId};
use tracing::info;
use uuid::Uuid;

use crate::PermissionResolver;
use crate::access_ports::{CreatePermissionInput, RoleAdminRepository};

const SUPER_USER_ROLE_NAME: &str = "Administrator";

/// Outcome of one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessBootstrapReport {
    /// Identifier of the global super-user role.
    pub admin_role_id: Uuid,
    /// Number of built-in permissions present after the run.
    pub seeded_permissions: usize,
    /// Subject granted the super-user role, if one was configured.
    pub admin_subject: Option<SubjectId>,
}

/// Idempotent startup seeding of the super-user role and built-in permissions.
#[derive(Clone)]
pub struct AccessBootstrapService {
    repository: Arc<dyn RoleAdminRepository>,
    resolver: PermissionResolver,
}

impl AccessBootstrapService {
    /// Creates a new bootstrap service.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleAdminRepository>, resolver: PermissionResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Ensures the global super-user role and built-in permissions exist and,
    /// when a subject is given, assigns that subject the super-user role.
    pub async fn run(&self, admin_subject: Option<&SubjectId>) -> AppResult<AccessBootstrapReport> {
        let admin_role = self
            .repository
            .ensure_global_role(&RoleSlug::super_user(), SUPER_USER_ROLE_NAME)
            .await?;

        for builtin in BuiltinPermission::all() {
            self.repository
                .ensure_permission(CreatePermissionInput {
                    key: builtin.key(),
                    description: Some(builtin.description().to_owned()),
                })
                .await?;
        }

        if let Some(subject) = admin_subject {
            self.repository
                .assign_role(subject, admin_role.role_id, None)
                .await?;
            self.resolver.invalidate(subject).await;
            info!(subject = %subject, "bootstrap super-user assigned");
        }

        // Reactivating the role can change any holder's effective set.
        self.resolver.invalidate_all().await;

        let report = AccessBootstrapReport {
            admin_role_id: admin_role.role_id,
            seeded_permissions: BuiltinPermission::all().len(),
            admin_subject: admin_subject.cloned(),
        };
        info!(
            admin_role_id = %report.admin_role_id,
            seeded_permissions = report.seeded_permissions,
            "access bootstrap completed"
        );

        Ok(report)
    }
}
