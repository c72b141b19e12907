use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Routes reachable without a token. Browsing is anonymous; anything that
/// writes or exposes account data requires auth.
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    excluded_paths: Vec<&'static str>,
    get_only_prefixes: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/categories",
                "/api/v1/subscriptions/plans",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/auth/"],
            // Authenticated even though they sit under a public prefix
            excluded_paths: vec!["/api/v1/auth/me"],
            // Public for reads only: listing and detail pages
            get_only_prefixes: vec!["/api/v1/advertisements"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        method == Method::GET
            && self
                .get_only_prefixes
                .iter()
                .any(|&prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight never carries credentials
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let auth_header = req.headers().get("Authorization");

        let token = if let Some(auth_value) = auth_header {
            if let Ok(auth_str) = auth_value.to_str() {
                auth_str.strip_prefix("Bearer ")
            } else {
                None
            }
        } else {
            None
        };

        if let Some(token) = token {
            match self.jwt_service.verify_token(token) {
                Ok(auth_user) => {
                    req.extensions_mut().insert(auth_user);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(_) => {
                    let error =
                        AppError::AuthError("Credencial inválida ou expirada".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            }
        } else {
            let error = AppError::AuthError("Token de acesso ausente".to_string());
            Box::pin(async move { Err(error.into()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_routes_public_except_me() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/register"));
        assert!(paths.is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/auth/me"));
    }

    #[test]
    fn test_listing_reads_public_writes_not() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::GET, "/api/v1/advertisements"));
        assert!(paths.is_public(
            &Method::GET,
            "/api/v1/advertisements/7c2f6f46-1f0a-4e83-a8cb-0f4c5a9a9d2e"
        ));
        assert!(!paths.is_public(&Method::POST, "/api/v1/advertisements"));
        assert!(!paths.is_public(
            &Method::POST,
            "/api/v1/advertisements/7c2f6f46-1f0a-4e83-a8cb-0f4c5a9a9d2e/favorite"
        ));
    }

    #[test]
    fn test_reference_data_public() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::GET, "/api/v1/categories"));
        assert!(paths.is_public(&Method::GET, "/api/v1/subscriptions/plans"));
        assert!(!paths.is_public(&Method::POST, "/api/v1/subscriptions/upgrade"));
    }

    #[test]
    fn test_prefix_does_not_leak_into_siblings() {
        let paths = PublicPaths::new();
        // "/api/v1/advertisements" must not make a sibling path public
        assert!(!paths.is_public(&Method::GET, "/api/v1/advertisementsx"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/user/advertisements"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/admin/advertisements"));
    }
}
