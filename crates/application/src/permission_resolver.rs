use std::sync::Arc;

use galley_core::AppResult;
use galley_domain::{EffectivePermissionSet, PermissionKey, SubjectId};
use tracing::debug;
use uuid::Uuid;

use crate::PermissionCache;
use crate::access_ports::PermissionStore;

/// Computes and caches effective permission sets per subject.
///
/// Clones share the same store and cache.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn PermissionStore>,
    cache: Arc<PermissionCache>,
}

impl PermissionResolver {
    /// Creates a resolver over a store and an injected cache.
    #[must_use]
    pub fn new(store: Arc<dyn PermissionStore>, cache: Arc<PermissionCache>) -> Self {
        Self { store, cache }
    }

    /// Returns the cache used by this resolver.
    #[must_use]
    pub fn cache(&self) -> &PermissionCache {
        self.cache.as_ref()
    }

    /// Resolves the effective permission set for a raw subject identifier.
    pub async fn resolve(&self, subject: &str) -> AppResult<Arc<EffectivePermissionSet>> {
        let subject = SubjectId::parse(subject)?;
        self.resolve_subject(&subject).await
    }

    /// Resolves the effective permission set for a validated subject.
    ///
    /// A cache hit performs no store I/O.
    pub async fn resolve_subject(
        &self,
        subject: &SubjectId,
    ) -> AppResult<Arc<EffectivePermissionSet>> {
        self.cache
            .get_or_load(subject, move || self.load(subject))
            .await
    }

    async fn load(&self, subject: &SubjectId) -> AppResult<EffectivePermissionSet> {
        let roles = self.store.find_active_roles_for_user(subject).await?;
        let role_ids: Vec<Uuid> = roles
            .iter()
            .filter(|role| role.is_active)
            .map(|role| role.role_id)
            .collect();

        let permissions = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.store.find_permissions_for_roles(&role_ids).await?
        };

        let resolved = EffectivePermissionSet::from_grants(subject.clone(), &roles, permissions);
        debug!(
            subject = %subject,
            roles = resolved.role_slugs().len(),
            permissions = resolved.permissions().len(),
            super_user = resolved.is_super_user(),
            "resolved effective permissions"
        );

        Ok(resolved)
    }

    /// Evicts the cached set of one subject after its role assignments change.
    pub async fn invalidate(&self, subject: &SubjectId) {
        self.cache.invalidate(subject).await;
        debug!(subject = %subject, "invalidated cached permissions");
    }

    /// Evicts every cached set after any role's permission grants change.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
        debug!("invalidated all cached permissions");
    }

    /// Returns whether the subject holds the permission or is a super-user.
    pub async fn has_permission(
        &self,
        subject: &SubjectId,
        permission: &PermissionKey,
    ) -> AppResult<bool> {
        Ok(self.resolve_subject(subject).await?.allows(permission))
    }

    /// Returns whether the subject holds at least one of the permissions.
    pub async fn has_any_permission(
        &self,
        subject: &SubjectId,
        checks: &[PermissionKey],
    ) -> AppResult<bool> {
        Ok(self.resolve_subject(subject).await?.allows_any(checks))
    }

    /// Returns whether the subject holds every one of the permissions.
    pub async fn has_all_permissions(
        &self,
        subject: &SubjectId,
        checks: &[PermissionKey],
    ) -> AppResult<bool> {
        Ok(self.resolve_subject(subject).await?.allows_all(checks))
    }

    /// Returns whether the subject holds the active role.
    pub async fn has_role(&self, subject: &SubjectId, slug: &str) -> AppResult<bool> {
        Ok(self.resolve_subject(subject).await?.has_role(slug))
    }

    /// Returns whether the subject holds at least one of the active roles.
    pub async fn has_any_role<S>(&self, subject: &SubjectId, slugs: &[S]) -> AppResult<bool>
    where
        S: AsRef<str> + Sync,
    {
        Ok(self.resolve_subject(subject).await?.has_any_role(slugs))
    }

    /// Returns whether the subject holds every one of the active roles.
    pub async fn has_all_roles<S>(&self, subject: &SubjectId, slugs: &[S]) -> AppResult<bool>
    where
        S: AsRef<str> + Sync,
    {
        Ok(self.resolve_subject(subject).await?.has_all_roles(slugs))
    }

    /// Returns whether the subject holds an active super-user role.
    pub async fn is_super_user(&self, subject: &SubjectId) -> AppResult<bool> {
        Ok(self.resolve_subject(subject).await?.is_super_user())
    }

    /// Checks an open-vocabulary `(resource, action)` pair for a raw subject.
    pub async fn check_access(
        &self,
        subject: &str,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        let subject = SubjectId::parse(subject)?;
        let permission = PermissionKey::new(resource, action)?;
        self.has_permission(&subject, &permission).await
    }
}

#[cfg(test)]
mod tests;
