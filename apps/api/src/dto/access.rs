use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Open-vocabulary permission check for the signed-in subject.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-check-request.ts"
)]
pub struct AccessCheckRequest {
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-check-response.ts"
)]
pub struct AccessCheckResponse {
    pub allowed: bool,
}
