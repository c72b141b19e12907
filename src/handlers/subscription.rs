use crate::error::AppError;
use crate::handlers::auth::get_auth_user;
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/subscriptions/plans",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Planos disponíveis", body = [PlanResponse])
    )
)]
pub async fn list_plans(
    subscription_service: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    match subscription_service.get_plans().await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plans
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/upgrade",
    tag = "subscriptions",
    request_body = UpgradeSubscriptionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Plano atualizado", body = SubscriptionResponse),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Plano não encontrado")
    )
)]
pub async fn upgrade(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<UpgradeSubscriptionRequest>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match subscription_service
        .upgrade_subscription(auth_user.id, request.into_inner())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscription,
            "message": "Plano atualizado com sucesso"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("/plans", web::get().to(list_plans))
            .route("/upgrade", web::post().to(upgrade)),
    );
}
