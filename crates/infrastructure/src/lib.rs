//! Infrastructure adapters for access-control ports.

#![forbid(unsafe_code)]

mod access_rows;
mod in_memory_access_store;
mod postgres_permission_store;
mod postgres_role_admin_repository;
mod store_error;

pub use in_memory_access_store::InMemoryAccessStore;
pub use postgres_permission_store::PostgresPermissionStore;
pub use postgres_role_admin_repository::PostgresRoleAdminRepository;
