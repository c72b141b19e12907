use crate::models::*;
use crate::services::CategoryService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categorias ativas", body = [CategoryResponse])
    )
)]
pub async fn list_categories(
    category_service: web::Data<CategoryService>,
) -> Result<HttpResponse> {
    match category_service.get_categories().await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": categories
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn category_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/categories").route("", web::get().to(list_categories)));
}
