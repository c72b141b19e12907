use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::advertisement::list_advertisements,
        handlers::advertisement::get_advertisement,
        handlers::advertisement::create_advertisement,
        handlers::advertisement::toggle_favorite,
        handlers::user::get_profile,
        handlers::user::get_my_advertisements,
        handlers::user::get_stats,
        handlers::user::can_create_ad,
        handlers::category::list_categories,
        handlers::subscription::list_plans,
        handlers::subscription::upgrade,
        handlers::ai::generate_description,
        handlers::admin::list_moderation_queue,
        handlers::admin::moderate_advertisement,
        handlers::admin::update_user_status,
    ),
    components(
        schemas(
            UserType,
            UserStatus,
            RegisterRequest,
            LoginRequest,
            UpdateUserStatusRequest,
            UserResponse,
            AuthResponse,
            SellerStatsResponse,
            AdStatus,
            ModerationStatus,
            CreateAdvertisementRequest,
            AdvertisementFilters,
            AdvertisementResponse,
            CreateAdvertisementResponse,
            FavoriteResponse,
            ModerationAction,
            ModerateAdvertisementRequest,
            ModerationQuery,
            SubscriptionStatus,
            PlanResponse,
            SubscriptionResponse,
            UpgradeSubscriptionRequest,
            CanCreateAdResponse,
            CategoryResponse,
            GenerateDescriptionRequest,
            GenerateDescriptionResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Cadastro e autenticação"),
        (name = "advertisements", description = "Anúncios e busca"),
        (name = "user", description = "Perfil e painel do vendedor"),
        (name = "categories", description = "Categorias"),
        (name = "subscriptions", description = "Planos e assinaturas"),
        (name = "ai", description = "Geração de descrições"),
        (name = "admin", description = "Moderação e administração"),
    ),
    info(
        title = "Planta Fácil API",
        version = "1.0.0",
        description = "API REST do marketplace Planta Fácil",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
