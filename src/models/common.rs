use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload inside the `{"success": false, "error": ...}` envelope
/// produced by `AppError::error_response`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "VALIDATION_ERROR")]
    pub code: String,
    #[schema(example = "Título deve ter pelo menos 5 caracteres")]
    pub message: String,
}
