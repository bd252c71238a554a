//! Route guards checking the caller's effective permissions.
//!
//! A guard is attached with
//! `route_layer(from_fn_with_state(guard, guards::enforce))` and reads the
//! [`UserIdentity`] placed in request extensions by the identity middleware.
//! Every failure path ends in a structured 403; nothing falls through to the
//! generic error handler.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use galley_application::PermissionResolver;
use galley_core::{AppResult, UserIdentity};
use galley_domain::{PermissionKey, SubjectId};
use tracing::{error, warn};

mod denial;

pub use denial::{AccessDeniedResponse, DenialCode};

/// Boolean expression a guard evaluates over the effective permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// One permission must be held.
    Permission(PermissionKey),
    /// At least one permission must be held; empty never matches.
    AnyPermission(Vec<PermissionKey>),
    /// Every permission must be held; empty always matches.
    AllPermissions(Vec<PermissionKey>),
    /// One active role slug must be held.
    Role(String),
    /// At least one of the role slugs must be held.
    AnyRole(Vec<String>),
    /// Every role slug must be held.
    AllRoles(Vec<String>),
    /// The caller must hold an active `admin` role.
    SuperUser,
}

impl Requirement {
    fn denied_code(&self) -> DenialCode {
        match self {
            Self::Permission(_) | Self::AnyPermission(_) | Self::AllPermissions(_) => {
                DenialCode::PermissionDenied
            }
            Self::Role(_) | Self::AnyRole(_) | Self::AllRoles(_) => DenialCode::RoleRequired,
            Self::SuperUser => DenialCode::SuperUserRequired,
        }
    }

    fn check_failed_code(&self) -> DenialCode {
        match self.denied_code() {
            DenialCode::RoleRequired => DenialCode::RoleCheckFailed,
            DenialCode::SuperUserRequired => DenialCode::SuperUserCheckFailed,
            _ => DenialCode::PermissionCheckFailed,
        }
    }

    fn denied_message(&self) -> String {
        match self {
            Self::Permission(permission) => format!("missing permission '{permission}'"),
            Self::AnyPermission(permissions) => format!(
                "requires at least one of the permissions {}",
                join(permissions)
            ),
            Self::AllPermissions(permissions) => {
                format!("requires all of the permissions {}", join(permissions))
            }
            Self::Role(slug) => format!("requires role '{slug}'"),
            Self::AnyRole(slugs) => format!("requires at least one of the roles {}", join(slugs)),
            Self::AllRoles(slugs) => format!("requires all of the roles {}", join(slugs)),
            Self::SuperUser => "requires super-user access".to_owned(),
        }
    }

    fn check_failed_message(&self) -> &'static str {
        match self.check_failed_code() {
            DenialCode::RoleCheckFailed => "role check could not be completed",
            DenialCode::SuperUserCheckFailed => "super-user check could not be completed",
            _ => "permission check could not be completed",
        }
    }
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("'{value}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// State of one guard layer: the shared resolver plus what it requires.
#[derive(Clone)]
pub struct RouteGuard {
    resolver: PermissionResolver,
    requirement: Arc<Requirement>,
}

impl RouteGuard {
    /// Creates a guard for an arbitrary requirement.
    #[must_use]
    pub fn new(resolver: PermissionResolver, requirement: Requirement) -> Self {
        Self {
            resolver,
            requirement: Arc::new(requirement),
        }
    }

    /// Returns the requirement this guard enforces.
    #[must_use]
    pub fn requirement(&self) -> &Requirement {
        self.requirement.as_ref()
    }

    async fn evaluate(&self, subject: &SubjectId) -> AppResult<bool> {
        let resolver = &self.resolver;
        match self.requirement.as_ref() {
            Requirement::Permission(permission) => {
                resolver.has_permission(subject, permission).await
            }
            Requirement::AnyPermission(checks) => {
                resolver.has_any_permission(subject, checks).await
            }
            Requirement::AllPermissions(checks) => {
                resolver.has_all_permissions(subject, checks).await
            }
            Requirement::Role(slug) => resolver.has_role(subject, slug).await,
            Requirement::AnyRole(slugs) => {
                resolver.has_any_role(subject, slugs.as_slice()).await
            }
            Requirement::AllRoles(slugs) => {
                resolver.has_all_roles(subject, slugs.as_slice()).await
            }
            Requirement::SuperUser => resolver.is_super_user(subject).await,
        }
    }
}

/// Requires one permission (super-users pass).
#[must_use]
pub fn require_permission(resolver: &PermissionResolver, permission: PermissionKey) -> RouteGuard {
    RouteGuard::new(resolver.clone(), Requirement::Permission(permission))
}

/// Requires at least one of the permissions; an empty list never passes
/// unless the caller is a super-user.
#[must_use]
pub fn require_any_permission(
    resolver: &PermissionResolver,
    permissions: impl IntoIterator<Item = PermissionKey>,
) -> RouteGuard {
    RouteGuard::new(
        resolver.clone(),
        Requirement::AnyPermission(permissions.into_iter().collect()),
    )
}

/// Requires every listed permission.
#[must_use]
pub fn require_all_permissions(
    resolver: &PermissionResolver,
    permissions: impl IntoIterator<Item = PermissionKey>,
) -> RouteGuard {
    RouteGuard::new(
        resolver.clone(),
        Requirement::AllPermissions(permissions.into_iter().collect()),
    )
}

/// Requires an active role by slug. Roles are not bypassed by super-users.
#[must_use]
pub fn require_role(resolver: &PermissionResolver, slug: impl Into<String>) -> RouteGuard {
    RouteGuard::new(resolver.clone(), Requirement::Role(slug.into()))
}

/// Requires at least one of the role slugs.
#[must_use]
pub fn require_any_role<S: Into<String>>(
    resolver: &PermissionResolver,
    slugs: impl IntoIterator<Item = S>,
) -> RouteGuard {
    RouteGuard::new(
        resolver.clone(),
        Requirement::AnyRole(slugs.into_iter().map(Into::into).collect()),
    )
}

/// Requires every listed role slug.
#[must_use]
pub fn require_all_roles<S: Into<String>>(
    resolver: &PermissionResolver,
    slugs: impl IntoIterator<Item = S>,
) -> RouteGuard {
    RouteGuard::new(
        resolver.clone(),
        Requirement::AllRoles(slugs.into_iter().map(Into::into).collect()),
    )
}

/// Requires an active `admin` role.
#[must_use]
pub fn require_super_user(resolver: &PermissionResolver) -> RouteGuard {
    RouteGuard::new(resolver.clone(), Requirement::SuperUser)
}

/// Middleware evaluating a [`RouteGuard`] against the request identity.
pub async fn enforce(State(guard): State<RouteGuard>, request: Request, next: Next) -> Response {
    let requirement = guard.requirement();

    let subject = match request.extensions().get::<UserIdentity>() {
        Some(identity) => SubjectId::parse(identity.subject()),
        None => {
            warn!(
                code = requirement.denied_code().as_str(),
                path = %request.uri().path(),
                "request without authenticated subject rejected by guard"
            );
            return AccessDeniedResponse::new(
                requirement.denied_code(),
                "authentication required",
            )
            .into_response();
        }
    };

    let subject = match subject {
        Ok(subject) => subject,
        Err(error) => {
            warn!(
                code = requirement.denied_code().as_str(),
                %error,
                "session subject rejected by guard"
            );
            return AccessDeniedResponse::new(
                requirement.denied_code(),
                "authenticated subject is not valid",
            )
            .into_response();
        }
    };

    match guard.evaluate(&subject).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            let code = requirement.denied_code();
            warn!(
                subject = %subject,
                code = code.as_str(),
                requirement = ?requirement,
                path = %request.uri().path(),
                "access denied"
            );
            AccessDeniedResponse::new(code, requirement.denied_message()).into_response()
        }
        Err(error) => {
            let code = requirement.check_failed_code();
            error!(
                subject = %subject,
                code = code.as_str(),
                requirement = ?requirement,
                %error,
                "access check failed"
            );
            AccessDeniedResponse::new(code, requirement.check_failed_message()).into_response()
        }
    }
}
