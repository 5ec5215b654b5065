//! Role and level authorization.
//!
//! Two checks sit on top of [`AuthUser`]:
//! 1. [`require_admin`] middleware (or the [`RequireAdmin`] extractor) for
//!    admin-only routes
//! 2. [`check_level`] for level-scoped resources, which admins bypass

use athenaeum_core::AppError;
use athenaeum_models::{Level, User};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const ADMIN_REQUIRED: &str = "Access denied. Admin only";

pub fn check_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden(ADMIN_REQUIRED))
    }
}

/// Passes when the caller is an admin or their level is at or above
/// `required` in the academic hierarchy.
pub fn check_level(user: &User, required: Level) -> Result<(), AppError> {
    if user.is_admin() || user.level.satisfies(required) {
        Ok(())
    } else {
        Err(AppError::insufficient_level())
    }
}

/// Rejects non-admin callers before the handler runs.
///
/// ```rust,ignore
/// let admin_routes = init_users_router()
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthUser(user) = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_admin(&user)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Extractor form of [`require_admin`].
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        check_admin(&user)?;
        Ok(RequireAdmin(user))
    }
}
