use athenaeum_config::RateLimitConfig;
use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    forgot_password, get_me, login, register, resend_verification, reset_password,
    update_preferences, update_profile, verify_email,
};
use crate::router::limit;
use crate::state::AppState;

pub fn init_auth_router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", limit(post(login), rate_limit, &rate_limit.login))
        .route("/verify-email/{token}", get(verify_email))
        .route(
            "/forgot-password",
            limit(post(forgot_password), rate_limit, &rate_limit.email),
        )
        .route("/reset-password/{token}", post(reset_password))
        .route(
            "/resend-verification",
            limit(post(resend_verification), rate_limit, &rate_limit.email),
        )
        .route("/me", get(get_me))
        .route("/profile", put(update_profile))
        .route("/preferences", put(update_preferences))
}
