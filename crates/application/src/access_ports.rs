mod inputs;
mod repositories;

pub use inputs::{CreatePermissionInput, CreateRoleInput, RoleListQuery};
pub use repositories::{PermissionStore, RoleAdminRepository};
