use axum::http::StatusCode;
use serde::Serialize;
use ts_rs::TS;

/// Error envelope shared by every non-guard failure.
///
/// Mirrors the guard denial body so clients parse one shape.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(status: StatusCode, message: String) -> Self {
        Self {
            success: false,
            error: status.canonical_reason().unwrap_or("Error").to_owned(),
            message,
        }
    }
}
