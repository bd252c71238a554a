use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_admin_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let input = CreatePermissionInput {
        key: PermissionKey::new(payload.resource, payload.action)?,
        description: payload.description,
    };

    let permission = state
        .role_admin_service
        .create_permission(&user, input)
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<RolePermissionResponse>>> {
    let grants = state
        .role_admin_service
        .list_role_permissions(parse_role_id(role_id.as_str())?)
        .await?
        .into_iter()
        .map(RolePermissionResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn grant_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<GrantPermissionRequest>,
) -> ApiResult<StatusCode> {
    let permission = PermissionKey::from_str(payload.permission.as_str())?;

    state
        .role_admin_service
        .grant_permission(&user, parse_role_id(role_id.as_str())?, &permission)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, permission)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let permission = PermissionKey::from_str(permission.as_str())?;

    state
        .role_admin_service
        .revoke_permission(&user, parse_role_id(role_id.as_str())?, &permission)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
