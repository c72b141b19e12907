use crate::error::AppError;
use crate::handlers::auth::get_auth_user;
use crate::models::*;
use crate::services::{AdvertisementService, SubscriptionService, UserService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Perfil do usuário", body = UserResponse),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match user_service.get_user_profile(auth_user.id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/advertisements",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Anúncios do vendedor", body = [AdvertisementResponse]),
        (status = 401, description = "Não autorizado")
    )
)]
pub async fn get_my_advertisements(
    advertisement_service: web::Data<AdvertisementService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match advertisement_service
        .get_user_advertisements(auth_user.id)
        .await
    {
        Ok(advertisements) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": advertisements
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/stats",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Estatísticas do painel do vendedor", body = SellerStatsResponse),
        (status = 401, description = "Não autorizado")
    )
)]
pub async fn get_stats(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match user_service.get_seller_stats(auth_user.id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/can-create-ad",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Situação da cota do plano", body = CanCreateAdResponse),
        (status = 401, description = "Não autorizado")
    )
)]
pub async fn can_create_ad(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    let can_create = subscription_service
        .can_create_advertisement(auth_user.id)
        .await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": CanCreateAdResponse { can_create }
    })))
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/advertisements", web::get().to(get_my_advertisements))
            .route("/stats", web::get().to(get_stats))
            .route("/can-create-ad", web::get().to(can_create_ad)),
    );
}
