use athenaeum_core::AppError;
use athenaeum_models::User;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

use crate::state::AppState;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
///
/// Rejections, in order:
/// - no bearer header: `no_token`
/// - bad signature, malformed or expired token: `invalid_token`
/// - account no longer exists: `user_not_found`
/// - account deactivated: `account_deactivated`
///
/// The resolved user is cached in the request extensions, so a handler
/// behind [`require_admin`](crate::middleware::role::require_admin) does not
/// hit the store twice.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<AuthUser>() {
            return Ok(resolved.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::no_token())?;

        let user = state.auth.authenticate(bearer.token()).await?;

        let resolved = AuthUser(user);
        parts.extensions.insert(resolved.clone());
        Ok(resolved)
    }
}
