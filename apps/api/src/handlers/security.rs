use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use galley_application::{CreatePermissionInput, CreateRoleInput, RoleListQuery};
use galley_core::{AppError, TenantId, UserIdentity};
use galley_domain::{PermissionKey, RoleSlug, SubjectId};
use uuid::Uuid;

use crate::dto::{
    AssignRoleRequest, CreatePermissionRequest, CreateRoleRequest, GrantPermissionRequest,
    ListRolesQuery, PermissionResponse, RolePermissionResponse, RoleResponse,
    UpdateRoleStatusRequest, UserRoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod assignments;
mod permissions;
mod roles;

pub use assignments::{assign_role_handler, list_user_roles_handler, unassign_role_handler};
pub use permissions::{
    create_permission_handler, grant_permission_handler, list_permissions_handler,
    list_role_permissions_handler, revoke_permission_handler,
};
pub use roles::{
    create_role_handler, delete_role_handler, get_role_handler, invalidate_access_cache_handler,
    list_roles_handler, update_role_status_handler,
};

fn parse_tenant_id(value: Option<&str>) -> Result<Option<TenantId>, AppError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            Uuid::parse_str(value)
                .map(TenantId::from_uuid)
                .map_err(|error| AppError::Validation(format!("invalid tenant_id: {error}")))
        })
        .transpose()
}

fn parse_role_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid role_id '{value}': {error}")))
}
