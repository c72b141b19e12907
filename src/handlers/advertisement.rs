use crate::error::AppError;
use crate::handlers::auth::get_auth_user;
use crate::models::*;
use crate::services::AdvertisementService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/advertisements",
    tag = "advertisements",
    params(
        ("category" = Option<String>, Query, description = "Slug da categoria"),
        ("search" = Option<String>, Query, description = "Busca por texto"),
        ("min_price" = Option<i64>, Query, description = "Preço mínimo em centavos"),
        ("max_price" = Option<i64>, Query, description = "Preço máximo em centavos"),
        ("city" = Option<String>, Query, description = "Cidade do vendedor"),
        ("state" = Option<String>, Query, description = "UF do vendedor"),
        ("featured" = Option<bool>, Query, description = "Somente destaques"),
        ("limit" = Option<u64>, Query, description = "Tamanho da página"),
        ("offset" = Option<u64>, Query, description = "Deslocamento")
    ),
    responses(
        (status = 200, description = "Lista de anúncios", body = [AdvertisementResponse]),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn list_advertisements(
    advertisement_service: web::Data<AdvertisementService>,
    query: web::Query<AdvertisementFilters>,
) -> Result<HttpResponse> {
    match advertisement_service.find_advertisements(&query).await {
        Ok(advertisements) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": advertisements
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/advertisements/{id}",
    tag = "advertisements",
    params(
        ("id" = Uuid, Path, description = "Identificador do anúncio")
    ),
    responses(
        (status = 200, description = "Detalhes do anúncio", body = AdvertisementResponse),
        (status = 404, description = "Anúncio não encontrado")
    )
)]
pub async fn get_advertisement(
    advertisement_service: web::Data<AdvertisementService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match advertisement_service.get_advertisement(id).await {
        Ok(advertisement) => {
            // A failed counter bump never hides the listing
            if let Err(e) = advertisement_service.record_view(id).await {
                log::warn!("Failed to record view for advertisement {id}: {e:?}");
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": advertisement
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/advertisements",
    tag = "advertisements",
    request_body = CreateAdvertisementRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Anúncio criado", body = CreateAdvertisementResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Limite do plano atingido")
    )
)]
pub async fn create_advertisement(
    advertisement_service: web::Data<AdvertisementService>,
    req: HttpRequest,
    request: web::Json<CreateAdvertisementRequest>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match advertisement_service
        .create_advertisement(auth_user.id, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Anúncio criado e enviado para moderação"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/advertisements/{id}/favorite",
    tag = "advertisements",
    params(
        ("id" = Uuid, Path, description = "Identificador do anúncio")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Favorito alternado", body = FavoriteResponse),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Anúncio não encontrado")
    )
)]
pub async fn toggle_favorite(
    advertisement_service: web::Data<AdvertisementService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let Some(auth_user) = get_auth_user(&req) else {
        return Ok(AppError::AuthError("Não autorizado".to_string()).error_response());
    };

    match advertisement_service
        .toggle_favorite(auth_user.id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn advertisement_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/advertisements")
            .route("", web::get().to(list_advertisements))
            .route("", web::post().to(create_advertisement))
            .route("/{id}", web::get().to(get_advertisement))
            .route("/{id}/favorite", web::post().to(toggle_favorite)),
    );
}
