use std::sync::Arc;

use galley_application::{
    AccessBootstrapService, PermissionCache, PermissionResolver, RoleAdminService,
};
use galley_core::AppError;
use galley_infrastructure::{PostgresPermissionStore, PostgresRoleAdminRepository};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Wires the resolver and role administration over Postgres and seeds the
/// super-user role before the server accepts requests.
pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let permission_store = Arc::new(PostgresPermissionStore::new(pool.clone()));
    let role_admin_repository = Arc::new(PostgresRoleAdminRepository::new(pool.clone()));

    let cache = Arc::new(PermissionCache::new(config.permission_cache_ttl));
    let resolver = PermissionResolver::new(permission_store, cache);

    AccessBootstrapService::new(role_admin_repository.clone(), resolver.clone())
        .run(config.bootstrap_admin_subject.as_ref())
        .await?;

    Ok(AppState {
        role_admin_service: RoleAdminService::new(role_admin_repository, resolver.clone()),
        resolver,
        pool,
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    })
}
