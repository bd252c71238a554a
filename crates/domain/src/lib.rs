//! Domain entities and invariants for Galley access control.

#![forbid(unsafe_code)]

mod effective;
mod permission;
mod role;
mod subject;

pub use effective::EffectivePermissionSet;
pub use permission::{BuiltinPermission, PermissionDefinition, PermissionKey};
pub use role::{
    Role, RolePermissionGrant, RoleSlug, SUPER_USER_ROLE_SLUG, UserRoleAssignment,
    is_role_designated_super_user,
};
pub use subject::SubjectId;
