use axum::Json;
use axum::extract::{Extension, State};
use galley_core::UserIdentity;

use crate::dto::{AccessCheckRequest, AccessCheckResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Answers whether the caller holds an arbitrary `(resource, action)` pair.
pub async fn check_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AccessCheckRequest>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let allowed = state
        .resolver
        .check_access(
            user.subject(),
            payload.resource.as_str(),
            payload.action.as_str(),
        )
        .await?;

    Ok(Json(AccessCheckResponse { allowed }))
}
