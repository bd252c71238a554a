use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{MethodRouter, delete, get, post, put};
use galley_application::PermissionResolver;
use galley_domain::{BuiltinPermission, SUPER_USER_ROLE_SLUG};

use crate::guards::{
    self, RouteGuard, require_all_permissions, require_any_permission, require_permission,
    require_role, require_super_user,
};
use crate::handlers::security as handlers;
use crate::middleware;
use crate::state::AppState;

fn guarded(route: MethodRouter<AppState>, guard: RouteGuard) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(guard, guards::enforce))
}

/// Role-management routes. Each method carries its own guard; unauthenticated
/// callers reach the guard without an identity and are denied with 403.
pub(super) fn build_security_routes(resolver: &PermissionResolver) -> Router<AppState> {
    let role_read = || {
        require_any_permission(
            resolver,
            [
                BuiltinPermission::RoleRead.key(),
                BuiltinPermission::RoleManage.key(),
            ],
        )
    };
    let role_manage = || require_permission(resolver, BuiltinPermission::RoleManage.key());
    let user_role_manage = || require_permission(resolver, BuiltinPermission::UserRoleManage.key());

    Router::new()
        .route(
            "/api/security/roles",
            guarded(get(handlers::list_roles_handler), role_read())
                .merge(guarded(post(handlers::create_role_handler), role_manage())),
        )
        .route(
            "/api/security/roles/{role_id}",
            guarded(get(handlers::get_role_handler), role_read()).merge(guarded(
                delete(handlers::delete_role_handler),
                require_super_user(resolver),
            )),
        )
        .route(
            "/api/security/roles/{role_id}/status",
            guarded(put(handlers::update_role_status_handler), role_manage()),
        )
        .route(
            "/api/security/roles/{role_id}/permissions",
            guarded(
                get(handlers::list_role_permissions_handler),
                require_permission(resolver, BuiltinPermission::PermissionRead.key()),
            )
            .merge(guarded(
                post(handlers::grant_permission_handler),
                require_all_permissions(
                    resolver,
                    [
                        BuiltinPermission::RoleManage.key(),
                        BuiltinPermission::PermissionRead.key(),
                    ],
                ),
            )),
        )
        .route(
            "/api/security/roles/{role_id}/permissions/{permission}",
            guarded(delete(handlers::revoke_permission_handler), role_manage()),
        )
        .route(
            "/api/security/permissions",
            guarded(
                get(handlers::list_permissions_handler),
                require_permission(resolver, BuiltinPermission::PermissionRead.key()),
            )
            .merge(guarded(
                post(handlers::create_permission_handler),
                require_permission(resolver, BuiltinPermission::PermissionManage.key()),
            )),
        )
        .route(
            "/api/security/users/{subject}/roles",
            guarded(
                get(handlers::list_user_roles_handler),
                require_any_permission(
                    resolver,
                    [
                        BuiltinPermission::UserRoleRead.key(),
                        BuiltinPermission::UserRoleManage.key(),
                    ],
                ),
            )
            .merge(guarded(
                post(handlers::assign_role_handler),
                user_role_manage(),
            )),
        )
        .route(
            "/api/security/users/{subject}/roles/{role_id}",
            guarded(delete(handlers::unassign_role_handler), user_role_manage()),
        )
        .route(
            "/api/security/access-cache/invalidate",
            guarded(
                post(handlers::invalidate_access_cache_handler),
                require_role(resolver, SUPER_USER_ROLE_SLUG),
            ),
        )
        .route_layer(from_fn(middleware::load_identity))
}
