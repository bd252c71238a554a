use super::*;

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> ApiResult<Json<Vec<UserRoleResponse>>> {
    let subject = SubjectId::parse(subject.as_str())?;
    let assignments = state
        .role_admin_service
        .list_user_roles(&subject)
        .await?
        .into_iter()
        .map(UserRoleResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    let subject = SubjectId::parse(subject.as_str())?;

    state
        .role_admin_service
        .assign_role(&user, &subject, parse_role_id(payload.role_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((subject, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let subject = SubjectId::parse(subject.as_str())?;

    state
        .role_admin_service
        .unassign_role(&user, &subject, parse_role_id(role_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
