use std::sync::Arc;

use athenaeum_config::RateLimitConfig;
use athenaeum_config::rate_limit::Quota;
use athenaeum_observability::{logging_middleware, metrics_middleware};
use axum::http::{HeaderValue, Method};
use axum::routing::MethodRouter;
use axum::{Router, middleware};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::middleware::role::require_admin;
use crate::modules::access::router::init_access_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Puts `route` behind a per-IP limiter for `quota`, unless limiting is off.
pub(crate) fn limit(
    route: MethodRouter<AppState>,
    config: &RateLimitConfig,
    quota: &Quota,
) -> MethodRouter<AppState> {
    if !config.enabled {
        return route;
    }
    match quota.governor_config() {
        Some(governor) => route.layer(GovernorLayer::new(Arc::new(governor))),
        None => route,
    }
}

fn api_router(state: &AppState) -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", init_auth_router(&state.rate_limit_config))
        .nest(
            "/users",
            init_users_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .nest("/access", init_access_router());

    let general = state
        .rate_limit_config
        .enabled
        .then(|| state.rate_limit_config.general.governor_config())
        .flatten();

    match general {
        Some(governor) => api.layer(GovernorLayer::new(Arc::new(governor))),
        None => api,
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api_router(&state))
        .with_state(state.clone())
        // MatchedPath only exists inside route layers
        .route_layer(middleware::from_fn(metrics_middleware))
        .route_layer(middleware::from_fn(logging_middleware))
        .layer(cors_layer(&state))
}
