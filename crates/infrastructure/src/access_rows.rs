use chrono::{DateTime, Utc};
use galley_core::{AppError, AppResult, TenantId};
use galley_domain::{
    PermissionDefinition, PermissionKey, Role, RolePermissionGrant, RoleSlug, SubjectId,
    UserRoleAssignment,
};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    name: String,
    slug: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> AppResult<Self> {
        Ok(Self {
            role_id: row.id,
            tenant_id: row.tenant_id.map(TenantId::from_uuid),
            name: row.name,
            slug: decode_slug(row.slug.as_str())?,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionKeyRow {
    resource: String,
    action: String,
}

impl TryFrom<PermissionKeyRow> for PermissionKey {
    type Error = AppError;

    fn try_from(row: PermissionKeyRow) -> AppResult<Self> {
        decode_key(row.resource, row.action)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    id: Uuid,
    resource: String,
    action: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PermissionRow> for PermissionDefinition {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> AppResult<Self> {
        Ok(Self {
            permission_id: row.id,
            key: decode_key(row.resource, row.action)?,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleGrantRow {
    role_id: Uuid,
    resource: String,
    action: String,
    granted_by: Option<String>,
    granted_at: DateTime<Utc>,
}

impl TryFrom<RoleGrantRow> for RolePermissionGrant {
    type Error = AppError;

    fn try_from(row: RoleGrantRow) -> AppResult<Self> {
        Ok(Self {
            role_id: row.role_id,
            permission: decode_key(row.resource, row.action)?,
            granted_by: row.granted_by.as_deref().map(decode_subject).transpose()?,
            granted_at: row.granted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRoleRow {
    subject: String,
    role_id: Uuid,
    role_slug: String,
    granted_by: Option<String>,
    granted_at: DateTime<Utc>,
}

impl TryFrom<UserRoleRow> for UserRoleAssignment {
    type Error = AppError;

    fn try_from(row: UserRoleRow) -> AppResult<Self> {
        Ok(Self {
            subject: decode_subject(row.subject.as_str())?,
            role_id: row.role_id,
            role_slug: decode_slug(row.role_slug.as_str())?,
            granted_by: row.granted_by.as_deref().map(decode_subject).transpose()?,
            granted_at: row.granted_at,
        })
    }
}

/// Converts rows, failing on the first one holding corrupt data.
pub(crate) fn decode_rows<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Converts granted permission rows, dropping any the domain cannot represent.
///
/// A dropped row only removes access, so the remaining grants stay usable.
pub(crate) fn decode_granted_keys(rows: Vec<PermissionKeyRow>) -> Vec<PermissionKey> {
    rows.into_iter()
        .filter_map(|row| match PermissionKey::try_from(row) {
            Ok(key) => Some(key),
            Err(error) => {
                warn!(%error, "skipping unreadable permission grant");
                None
            }
        })
        .collect()
}

fn decode_slug(value: &str) -> AppResult<RoleSlug> {
    RoleSlug::parse(value)
        .map_err(|error| AppError::Internal(format!("invalid stored role slug '{value}': {error}")))
}

fn decode_subject(value: &str) -> AppResult<SubjectId> {
    SubjectId::parse(value)
        .map_err(|error| AppError::Internal(format!("invalid stored subject '{value}': {error}")))
}

fn decode_key(resource: String, action: String) -> AppResult<PermissionKey> {
    PermissionKey::new(resource.as_str(), action.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored permission '{resource}:{action}': {error}"
        ))
    })
}
