use std::sync::Arc;

use galley_core::{AppResult, UserIdentity};
use galley_domain::SubjectId;

use crate::PermissionResolver;
use crate::access_ports::RoleAdminRepository;

mod assignments;
mod permissions;
mod roles;

/// Application service for role, permission and assignment administration.
///
/// Every write that can change a subject's effective permissions is followed
/// by the matching resolver invalidation. Route guards authorize the caller.
#[derive(Clone)]
pub struct RoleAdminService {
    repository: Arc<dyn RoleAdminRepository>,
    resolver: PermissionResolver,
}

impl RoleAdminService {
    /// Creates a new role administration service.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleAdminRepository>, resolver: PermissionResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Forces every cached permission set to be recomputed.
    pub async fn invalidate_access_cache(&self, actor: &UserIdentity) {
        self.resolver.invalidate_all().await;
        tracing::info!(actor = actor.subject(), "access cache invalidated on request");
    }
}

fn actor_subject(actor: &UserIdentity) -> AppResult<SubjectId> {
    SubjectId::parse(actor.subject())
}

#[cfg(test)]
mod tests;
