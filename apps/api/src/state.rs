use galley_application::{PermissionResolver, RoleAdminService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: PermissionResolver,
    pub role_admin_service: RoleAdminService,
    pub pool: PgPool,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
