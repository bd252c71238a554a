use galley_core::UserIdentity;
use galley_domain::EffectivePermissionSet;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: &'static str,
}

/// API representation of the authenticated user and their effective access.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub tenant_id: Option<String>,
    pub roles: Vec<String>,
    /// `resource:action` pairs granted through active roles.
    pub permissions: Vec<String>,
    pub is_super_user: bool,
}

impl UserIdentityResponse {
    /// Creates a response from the identity and its resolved permission set.
    #[must_use]
    pub fn from_identity_with_access(
        identity: UserIdentity,
        access: &EffectivePermissionSet,
    ) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            tenant_id: identity.tenant_id().map(|tenant_id| tenant_id.to_string()),
            roles: access.role_slugs().iter().map(ToString::to_string).collect(),
            permissions: access
                .permissions()
                .iter()
                .map(ToString::to_string)
                .collect(),
            is_super_user: access.is_super_user(),
        }
    }
}
