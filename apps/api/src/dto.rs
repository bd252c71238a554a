mod access;
mod common;
mod security;

pub use access::{AccessCheckRequest, AccessCheckResponse};
pub use common::{HealthResponse, UserIdentityResponse};
pub use security::{
    AssignRoleRequest, CreatePermissionRequest, CreateRoleRequest, GrantPermissionRequest,
    ListRolesQuery, PermissionResponse, RolePermissionResponse, RoleResponse,
    UpdateRoleStatusRequest, UserRoleResponse,
};

#[cfg(test)]
mod tests {
    use super::{
        AccessCheckRequest, AccessCheckResponse, AssignRoleRequest, CreatePermissionRequest,
        CreateRoleRequest, GrantPermissionRequest, HealthResponse, PermissionResponse,
        RolePermissionResponse, RoleResponse, UpdateRoleStatusRequest, UserIdentityResponse,
        UserRoleResponse,
    };

    use crate::error::ErrorResponse;
    use crate::guards::{AccessDeniedResponse, DenialCode};
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        CreateRoleRequest::export(&config)?;
        UpdateRoleStatusRequest::export(&config)?;
        CreatePermissionRequest::export(&config)?;
        GrantPermissionRequest::export(&config)?;
        AssignRoleRequest::export(&config)?;
        AccessCheckRequest::export(&config)?;
        RoleResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        RolePermissionResponse::export(&config)?;
        UserRoleResponse::export(&config)?;
        AccessCheckResponse::export(&config)?;
        HealthResponse::export(&config)?;
        UserIdentityResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        DenialCode::export(&config)?;
        AccessDeniedResponse::export(&config)?;

        Ok(())
    }
}
