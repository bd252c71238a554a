use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use ts_rs::TS;

/// Machine-readable reason carried by every guard denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/denial-code.ts"
)]
pub enum DenialCode {
    /// A permission requirement evaluated to false.
    PermissionDenied,
    /// A role requirement evaluated to false.
    RoleRequired,
    /// The caller is not a super-user.
    SuperUserRequired,
    /// The permission check could not be evaluated.
    PermissionCheckFailed,
    /// The role check could not be evaluated.
    RoleCheckFailed,
    /// The super-user check could not be evaluated.
    SuperUserCheckFailed,
}

impl DenialCode {
    /// Returns the wire form of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::RoleRequired => "ROLE_REQUIRED",
            Self::SuperUserRequired => "SUPER_USER_REQUIRED",
            Self::PermissionCheckFailed => "PERMISSION_CHECK_FAILED",
            Self::RoleCheckFailed => "ROLE_CHECK_FAILED",
            Self::SuperUserCheckFailed => "SUPER_USER_CHECK_FAILED",
        }
    }
}

/// Body of the 403 returned by every guard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-denied-response.ts"
)]
pub struct AccessDeniedResponse {
    /// Always `false`.
    pub success: bool,
    /// Always `"Forbidden"`.
    pub error: &'static str,
    /// Human-readable reason.
    pub message: String,
    /// Machine-readable reason.
    pub code: DenialCode,
}

impl AccessDeniedResponse {
    pub(super) fn new(code: DenialCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: "Forbidden",
            message: message.into(),
            code,
        }
    }
}

impl IntoResponse for AccessDeniedResponse {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, Json(self)).into_response()
    }
}
