use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Query(query): Query<ListRolesQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let query = RoleListQuery {
        tenant_id: parse_tenant_id(query.tenant_id.as_deref())?,
        include_global: query.include_global.unwrap_or(true),
    };

    let roles = state
        .role_admin_service
        .list_roles(query)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .get_role(parse_role_id(role_id.as_str())?)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let input = CreateRoleInput {
        tenant_id: parse_tenant_id(payload.tenant_id.as_deref())?,
        name: payload.name,
        slug: RoleSlug::parse(payload.slug.as_str())?,
        description: payload.description,
    };

    let role = state.role_admin_service.create_role(&user, input).await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleStatusRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .set_role_active(&user, parse_role_id(role_id.as_str())?, payload.is_active)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_role(&user, parse_role_id(role_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn invalidate_access_cache_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> StatusCode {
    state.role_admin_service.invalidate_access_cache(&user).await;
    StatusCode::NO_CONTENT
}
