use crate::models::*;
use crate::services::{AuthService, UserService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub fn get_auth_user(req: &HttpRequest) -> Option<AuthUser> {
    req.extensions().get::<AuthUser>().cloned()
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Conta criada com sucesso", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 500, description = "Erro interno do servidor")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login realizado com sucesso", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Usuário autenticado", body = UserResponse),
        (status = 401, description = "Não autorizado")
    )
)]
pub async fn me(user_service: web::Data<UserService>, req: HttpRequest) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(crate::error::AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match user_service.get_user_profile(auth_user.id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}
