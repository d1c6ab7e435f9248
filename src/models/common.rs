use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope every failed request renders, mirrored here for the API
/// docs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub success: bool,
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}
