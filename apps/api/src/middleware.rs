use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use galley_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::warn;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Rejects requests without a session identity with 401.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Attaches the session identity when there is one and never rejects.
///
/// Used in front of route guards, which deny requests without an identity.
pub async fn load_identity(session: Session, mut request: Request, next: Next) -> Response {
    match session.get::<UserIdentity>(SESSION_USER_KEY).await {
        Ok(Some(identity)) => {
            request.extensions_mut().insert(identity);
        }
        Ok(None) => {}
        Err(error) => warn!(%error, "failed to read session identity"),
    }

    next.run(request).await
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok());

        // Non-browser clients send neither header.
        if (origin.is_some() || referer.is_some())
            && !is_allowed_origin(origin, referer, &state.frontend_url)
        {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_allowed_origin(origin: Option<&str>, referer: Option<&str>, frontend_url: &str) -> bool {
    origin == Some(frontend_url) || referer.is_some_and(|value| value.starts_with(frontend_url))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
