use std::collections::BTreeSet;

use crate::{PermissionKey, Role, RoleSlug, SubjectId};

/// Permissions and roles a subject effectively holds.
///
/// Derived from the store on demand and owned by the resolver cache. It is
/// never persisted and never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissionSet {
    subject: SubjectId,
    role_slugs: BTreeSet<RoleSlug>,
    permissions: BTreeSet<PermissionKey>,
    is_super_user: bool,
}

impl EffectivePermissionSet {
    /// Builds the set from a subject's roles and the permissions they grant.
    ///
    /// Inactive roles are ignored for both role membership and the super-user
    /// flag. Duplicate permissions collapse into one entry.
    #[must_use]
    pub fn from_grants(
        subject: SubjectId,
        roles: &[Role],
        permissions: impl IntoIterator<Item = PermissionKey>,
    ) -> Self {
        let role_slugs: BTreeSet<RoleSlug> = roles
            .iter()
            .filter(|role| role.is_active)
            .map(|role| role.slug.clone())
            .collect();
        let is_super_user = role_slugs.iter().any(RoleSlug::is_super_user);

        Self {
            subject,
            role_slugs,
            permissions: permissions.into_iter().collect(),
            is_super_user,
        }
    }

    /// Returns a set with no roles and no permissions.
    #[must_use]
    pub fn empty(subject: SubjectId) -> Self {
        Self {
            subject,
            role_slugs: BTreeSet::new(),
            permissions: BTreeSet::new(),
            is_super_user: false,
        }
    }

    /// Returns the subject the set was resolved for.
    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Returns the active role slugs.
    #[must_use]
    pub fn role_slugs(&self) -> &BTreeSet<RoleSlug> {
        &self.role_slugs
    }

    /// Returns the explicit permission grants.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<PermissionKey> {
        &self.permissions
    }

    /// Returns whether an active super-user role is held.
    #[must_use]
    pub fn is_super_user(&self) -> bool {
        self.is_super_user
    }

    /// Returns whether the permission is granted, honoring the super-user bypass.
    #[must_use]
    pub fn allows(&self, permission: &PermissionKey) -> bool {
        self.is_super_user || self.permissions.contains(permission)
    }

    /// Returns whether at least one check is granted. An empty list is `false`
    /// unless the subject is a super-user.
    #[must_use]
    pub fn allows_any(&self, checks: &[PermissionKey]) -> bool {
        self.is_super_user || checks.iter().any(|check| self.permissions.contains(check))
    }

    /// Returns whether every check is granted. An empty list is `true`.
    #[must_use]
    pub fn allows_all(&self, checks: &[PermissionKey]) -> bool {
        self.is_super_user || checks.iter().all(|check| self.permissions.contains(check))
    }

    /// Returns whether the active role is held. No super-user bypass.
    #[must_use]
    pub fn has_role(&self, slug: &str) -> bool {
        self.role_slugs.contains(slug)
    }

    /// Returns whether any of the roles is held. An empty list is `false`.
    #[must_use]
    pub fn has_any_role<S: AsRef<str>>(&self, slugs: &[S]) -> bool {
        slugs.iter().any(|slug| self.has_role(slug.as_ref()))
    }

    /// Returns whether all of the roles are held. An empty list is `true`.
    #[must_use]
    pub fn has_all_roles<S: AsRef<str>>(&self, slugs: &[S]) -> bool {
        slugs.iter().all(|slug| self.has_role(slug.as_ref()))
    }
}
