use crate::error::AppError;
use crate::handlers::auth::get_auth_user;
use crate::models::*;
use crate::services::AiService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/ai/generate-description",
    tag = "ai",
    request_body = GenerateDescriptionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Descrição gerada", body = GenerateDescriptionResponse),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Recurso não incluído no plano")
    )
)]
pub async fn generate_description(
    ai_service: web::Data<AiService>,
    req: HttpRequest,
    request: web::Json<GenerateDescriptionRequest>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match ai_service
        .generate_description(auth_user.id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ai_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai").route("/generate-description", web::post().to(generate_description)),
    );
}
