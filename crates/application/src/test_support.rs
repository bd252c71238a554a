use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use galley_core::{AppError, AppResult, TenantId};
use galley_domain::{
    PermissionDefinition, PermissionKey, Role, RolePermissionGrant, RoleSlug, SubjectId,
    UserRoleAssignment,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    CreatePermissionInput, CreateRoleInput, PermissionStore, RoleAdminRepository, RoleListQuery,
};

pub(crate) fn subject(value: &str) -> SubjectId {
    match SubjectId::parse(value) {
        Ok(subject) => subject,
        Err(error) => panic!("invalid test subject {value}: {error}"),
    }
}

pub(crate) fn key(resource: &str, action: &str) -> PermissionKey {
    match PermissionKey::new(resource, action) {
        Ok(key) => key,
        Err(error) => panic!("invalid test permission {resource}:{action}: {error}"),
    }
}

pub(crate) fn slug(value: &str) -> RoleSlug {
    match RoleSlug::parse(value) {
        Ok(slug) => slug,
        Err(error) => panic!("invalid test slug {value}: {error}"),
    }
}

/// Store fake backing both ports, counting resolver reads.
#[derive(Default)]
pub(crate) struct FakeAccessStore {
    roles: Mutex<Vec<Role>>,
    permissions: Mutex<Vec<PermissionDefinition>>,
    assignments: Mutex<Vec<UserRoleAssignment>>,
    grants: Mutex<Vec<RolePermissionGrant>>,
    role_queries: AtomicUsize,
    permission_queries: AtomicUsize,
    fail_reads: AtomicBool,
    read_delay_ms: AtomicU64,
}

impl FakeAccessStore {
    pub(crate) fn role_queries(&self) -> usize {
        self.role_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn permission_queries(&self) -> usize {
        self.permission_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Delays every role read, so concurrent callers overlap.
    pub(crate) fn slow_reads(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.read_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub(crate) async fn seed_role(&self, tenant_id: Option<TenantId>, value: &str) -> Uuid {
        let now = Utc::now();
        let role_id = Uuid::new_v4();
        self.roles.lock().await.push(Role {
            role_id,
            tenant_id,
            name: value.to_owned(),
            slug: slug(value),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        role_id
    }

    pub(crate) async fn seed_permission(&self, resource: &str, action: &str) {
        self.permissions.lock().await.push(PermissionDefinition {
            permission_id: Uuid::new_v4(),
            key: key(resource, action),
            description: None,
            created_at: Utc::now(),
        });
    }

    pub(crate) async fn role_count(&self) -> usize {
        self.roles.lock().await.len()
    }
}

#[async_trait]
impl PermissionStore for FakeAccessStore {
    async fn find_active_roles_for_user(&self, subject: &SubjectId) -> AppResult<Vec<Role>> {
        self.role_queries.fetch_add(1, Ordering::SeqCst);
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("fake store offline".to_owned()));
        }

        let role_ids: Vec<Uuid> = self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| &assignment.subject == subject)
            .map(|assignment| assignment.role_id)
            .collect();

        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role.is_active && role_ids.contains(&role.role_id))
            .cloned()
            .collect())
    }

    async fn find_permissions_for_roles(
        &self,
        role_ids: &[Uuid],
    ) -> AppResult<Vec<PermissionKey>> {
        self.permission_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("fake store offline".to_owned()));
        }

        // Duplicates are kept; the resolver collapses them.
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| role_ids.contains(&grant.role_id))
            .map(|grant| grant.permission.clone())
            .collect())
    }
}

#[async_trait]
impl RoleAdminRepository for FakeAccessStore {
    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| match (role.tenant_id, query.tenant_id) {
                (None, _) => query.include_global,
                (Some(_), None) => true,
                (Some(owner), Some(filter)) => owner == filter,
            })
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: Uuid) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.role_id == role_id)
            .cloned())
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if roles
            .iter()
            .any(|role| role.tenant_id == input.tenant_id && role.slug == input.slug)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.slug
            )));
        }

        let now = Utc::now();
        let role = Role {
            role_id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        roles.push(role.clone());
        Ok(role)
    }

    async fn ensure_global_role(&self, slug: &RoleSlug, name: &str) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if let Some(role) = roles
            .iter_mut()
            .find(|role| role.tenant_id.is_none() && &role.slug == slug)
        {
            role.is_active = true;
            return Ok(role.clone());
        }

        let now = Utc::now();
        let role = Role {
            role_id: Uuid::new_v4(),
            tenant_id: None,
            name: name.to_owned(),
            slug: slug.clone(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        roles.push(role.clone());
        Ok(role)
    }

    async fn set_role_active(&self, role_id: Uuid, is_active: bool) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        let role = roles
            .iter_mut()
            .find(|role| role.role_id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        role.is_active = is_active;
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let before = roles.len();
        roles.retain(|role| role.role_id != role_id);
        if roles.len() == before {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        self.assignments
            .lock()
            .await
            .retain(|assignment| assignment.role_id != role_id);
        self.grants
            .lock()
            .await
            .retain(|grant| grant.role_id != role_id);
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self.permissions.lock().await.clone())
    }

    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut permissions = self.permissions.lock().await;
        if permissions.iter().any(|permission| permission.key == input.key) {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.key
            )));
        }

        let permission = PermissionDefinition {
            permission_id: Uuid::new_v4(),
            key: input.key,
            description: input.description,
            created_at: Utc::now(),
        };
        permissions.push(permission.clone());
        Ok(permission)
    }

    async fn ensure_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let existing = self
            .permissions
            .lock()
            .await
            .iter()
            .find(|permission| permission.key == input.key)
            .cloned();
        match existing {
            Some(permission) => Ok(permission),
            None => self.create_permission(input).await,
        }
    }

    async fn list_role_permissions(&self, role_id: Uuid) -> AppResult<Vec<RolePermissionGrant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn grant_permission(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()> {
        if self.find_role(role_id).await?.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }
        if !self
            .permissions
            .lock()
            .await
            .iter()
            .any(|definition| &definition.key == permission)
        {
            return Err(AppError::NotFound(format!(
                "permission '{permission}' does not exist"
            )));
        }

        let mut grants = self.grants.lock().await;
        if !grants
            .iter()
            .any(|grant| grant.role_id == role_id && &grant.permission == permission)
        {
            grants.push(RolePermissionGrant {
                role_id,
                permission: permission.clone(),
                granted_by: granted_by.cloned(),
                granted_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
    ) -> AppResult<()> {
        let mut grants = self.grants.lock().await;
        let before = grants.len();
        grants.retain(|grant| !(grant.role_id == role_id && &grant.permission == permission));
        if grants.len() == before {
            return Err(AppError::NotFound(format!(
                "permission '{permission}' is not granted to role '{role_id}'"
            )));
        }
        Ok(())
    }

    async fn assign_role(
        &self,
        subject: &SubjectId,
        role_id: Uuid,
        granted_by: Option<&SubjectId>,
    ) -> AppResult<()> {
        let role = self
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        let mut assignments = self.assignments.lock().await;
        if !assignments
            .iter()
            .any(|assignment| &assignment.subject == subject && assignment.role_id == role_id)
        {
            assignments.push(UserRoleAssignment {
                subject: subject.clone(),
                role_id,
                role_slug: role.slug,
                granted_by: granted_by.cloned(),
                granted_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn unassign_role(&self, subject: &SubjectId, role_id: Uuid) -> AppResult<()> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(&assignment.subject == subject && assignment.role_id == role_id)
        });
        if assignments.len() == before {
            return Err(AppError::NotFound(format!(
                "subject '{subject}' does not hold role '{role_id}'"
            )));
        }
        Ok(())
    }

    async fn list_user_roles(&self, subject: &SubjectId) -> AppResult<Vec<UserRoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| &assignment.subject == subject)
            .cloned()
            .collect())
    }
}
