use crate::error::AppError;
use crate::handlers::auth::get_auth_user;
use crate::models::*;
use crate::services::AdminService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/admin/advertisements",
    tag = "admin",
    params(
        ("moderation_status" = Option<String>, Query, description = "pending, approved ou rejected")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Fila de moderação", body = [AdvertisementResponse]),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Acesso restrito a administradores")
    )
)]
pub async fn list_moderation_queue(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    query: web::Query<ModerationQuery>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };
    if let Err(e) = admin_service.require_admin(auth_user.id).await {
        return Ok(e.error_response());
    }

    match admin_service.get_moderation_queue(&query).await {
        Ok(advertisements) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": advertisements
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/advertisements/{id}/moderate",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Identificador do anúncio")
    ),
    request_body = ModerateAdvertisementRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Anúncio moderado"),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Acesso restrito a administradores"),
        (status = 404, description = "Anúncio não encontrado")
    )
)]
pub async fn moderate_advertisement(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<ModerateAdvertisementRequest>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };
    if let Err(e) = admin_service.require_admin(auth_user.id).await {
        return Ok(e.error_response());
    }

    match admin_service
        .moderate_advertisement(path.into_inner(), request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Moderação aplicada"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}/status",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Identificador do usuário")
    ),
    request_body = UpdateUserStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status do usuário atualizado", body = UserResponse),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Acesso restrito a administradores"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn update_user_status(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateUserStatusRequest>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };
    if let Err(e) = admin_service.require_admin(auth_user.id).await {
        return Ok(e.error_response());
    }

    match admin_service
        .set_user_status(path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/advertisements", web::get().to(list_moderation_queue))
            .route(
                "/advertisements/{id}/moderate",
                web::put().to(moderate_advertisement),
            )
            .route("/users/{id}/status", web::put().to(update_user_status)),
    );
}
