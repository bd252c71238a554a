//! Application services and ports for Galley access control.

#![forbid(unsafe_code)]

mod access_bootstrap_service;
mod access_ports;
mod permission_cache;
mod permission_resolver;
mod role_admin_service;

pub use access_bootstrap_service::{AccessBootstrapReport, AccessBootstrapService};
pub use access_ports::{
    CreatePermissionInput, CreateRoleInput, PermissionStore, RoleAdminRepository, RoleListQuery,
};
pub use permission_cache::PermissionCache;
pub use permission_resolver::PermissionResolver;
pub use role_admin_service::RoleAdminService;

#[cfg(test)]
mod test_support;
