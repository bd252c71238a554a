use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use galley_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the session identity with its effective access.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let access = state.resolver.resolve(identity.subject()).await?;

    Ok(Json(UserIdentityResponse::from_identity_with_access(
        identity, &access,
    )))
}
