use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateDescriptionRequest {
    #[schema(example = "Monstera Deliciosa")]
    pub title: String,
    #[schema(example = "plantas-interior")]
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateDescriptionResponse {
    pub description: String,
}
