use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use galley_application::{
    CreatePermissionInput, CreateRoleInput, PermissionStore, RoleAdminRepository, RoleListQuery,
};
use galley_core::{AppError, AppResult};
use galley_domain::{
    PermissionDefinition, PermissionKey, Role, RolePermissionGrant, RoleSlug, SubjectId,
    UserRoleAssignment,
};

#[derive(Debug, Default)]
struct AccessState {
    roles: BTreeMap<Uuid, Role>,
    permissions: BTreeMap<PermissionKey, PermissionDefinition>,
    user_roles: BTreeMap<(SubjectId, Uuid), UserRoleAssignment>,
    role_permissions: BTreeMap<(Uuid, PermissionKey), RolePermissionGrant>,
}

impl AccessState {
    fn role(&self, role_id: Uuid) -> AppResult<&Role> {
        self.roles
            .get(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

/// In-memory access store backing both the resolver and role administration.
///
/// Used for local development and API tests; all writes go through one lock.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    state: RwLock<AccessState>,
}

impl InMemoryAccessStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for InMemoryAccessStore {
    async fn find_active_roles_for_user(&self, subject: &SubjectId) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;

        Ok(state
            .user_roles
            .keys()
            .filter(|(holder, _)| holder == subject)
            .filter_map(|(_, role_id)| state.roles.get(role_id))
            .filter(|role| role.is_active)
            .cloned()
            .collect())
    }

    async fn find_permissions_for_roles(
        &self,
        role_ids: &[Uuid],
    ) -> AppResult<Vec<PermissionKey>> {
        let state = self.state.read().await;

        let permissions: BTreeSet<PermissionKey> = state
            .role_permissions
            .keys()
            .filter(|(role_id, _)| role_ids.contains(role_id))
            .map(|(_, permission)| permission.clone())
            .collect();

        Ok(permissions.into_iter().collect())
    }
}

#[async_trait]
impl RoleAdminRepository for InMemoryAccessStore {
    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;

        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|role| match (role.tenant_id, query.tenant_id) {
                (None, _) => query.include_global,
                (Some(_), None) => true,
                (Some(owner), Some(filter)) => owner == filter,
            })
            .cloned()
            .collect();
        roles.sort_by(|left, right| {
            left.tenant_id
                .map(|tenant_id| tenant_id.as_uuid())
                .cmp(&right.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
                .then_with(|| left.slug.cmp(&right.slug))
        });

        Ok(roles)
    }

    async fn find_role(&self, role_id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let mut state = self.state.write().await;

        if state
            .roles
            .values()
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
            name: input.name.trim().to_owned(),
            slug: input.slug,
            description: input.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(role.role_id, role.clone());

        Ok(role)
    }

    async fn ensure_global_role(&self, slug: &RoleSlug, name: &str) -> AppResult<Role> {
        let mut state = self.state.write().await;

        if let Some(role) = state
            .roles
            .values_mut()
            .find(|role| role.tenant_id.is_none() && &role.slug == slug)
        {
            if !role.is_active {
                role.is_active = true;
                role.updated_at = Utc::now();
            }
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
        state.roles.insert(role.role_id, role.clone());

        Ok(role)
    }

    async fn set_role_active(&self, role_id: Uuid, is_active: bool) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        role.is_active = is_active;
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        state
            .user_roles
            .retain(|(_, assigned_role), _| *assigned_role != role_id);
        state
            .role_permissions
            .retain(|(granting_role, _), _| *granting_role != role_id);
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .cloned()
            .collect())
    }

    async fn create_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.write().await;
        if state.permissions.contains_key(&input.key) {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.key
            )));
        }

        let permission = PermissionDefinition {
            permission_id: Uuid::new_v4(),
            key: input.key.clone(),
            description: input.description,
            created_at: Utc::now(),
        };
        state.permissions.insert(input.key, permission.clone());

        Ok(permission)
    }

    async fn ensure_permission(
        &self,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.write().await;
        let permission = state
            .permissions
            .entry(input.key.clone())
            .or_insert_with(|| PermissionDefinition {
                permission_id: Uuid::new_v4(),
                key: input.key,
                description: None,
                created_at: Utc::now(),
            });
        if permission.description.is_none() {
            permission.description = input.description;
        }

        Ok(permission.clone())
    }

    async fn list_role_permissions(&self, role_id: Uuid) -> AppResult<Vec<RolePermissionGrant>> {
        Ok(self
            .state
            .read()
            .await
            .role_permissions
            .values()
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
        let mut state = self.state.write().await;
        state.role(role_id)?;
        if !state.permissions.contains_key(permission) {
            return Err(AppError::NotFound(format!(
                "permission '{permission}' does not exist"
            )));
        }

        state
            .role_permissions
            .entry((role_id, permission.clone()))
            .or_insert_with(|| RolePermissionGrant {
                role_id,
                permission: permission.clone(),
                granted_by: granted_by.cloned(),
                granted_at: Utc::now(),
            });
        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: Uuid,
        permission: &PermissionKey,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .role_permissions
            .remove(&(role_id, permission.clone()))
            .is_none()
        {
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
        let mut state = self.state.write().await;
        let role_slug = state.role(role_id)?.slug.clone();

        state
            .user_roles
            .entry((subject.clone(), role_id))
            .or_insert_with(|| UserRoleAssignment {
                subject: subject.clone(),
                role_id,
                role_slug,
                granted_by: granted_by.cloned(),
                granted_at: Utc::now(),
            });
        Ok(())
    }

    async fn unassign_role(&self, subject: &SubjectId, role_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .user_roles
            .remove(&(subject.clone(), role_id))
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "subject '{subject}' does not hold role '{role_id}'"
            )));
        }

        Ok(())
    }

    async fn list_user_roles(&self, subject: &SubjectId) -> AppResult<Vec<UserRoleAssignment>> {
        let state = self.state.read().await;

        Ok(state
            .user_roles
            .values()
            .filter(|assignment| &assignment.subject == subject)
            .map(|assignment| {
                let mut assignment = assignment.clone();
                if let Some(role) = state.roles.get(&assignment.role_id) {
                    assignment.role_slug = role.slug.clone();
                }
                assignment
            })
            .collect())
    }
}
