use athenaeum_core::{AppError, ErrorBody};
use athenaeum_models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, PreferencesResponse,
    RegisterRequest, ResetPasswordRequest, UpdatePreferencesRequest, UpdateProfileRequest,
    UserProfile, VerifyEmailResponse,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; a verification email is on its way", body = AuthResponse),
        (status = 400, description = "Email or student ID already registered", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = state.auth.register(dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and receive a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth.login(dto).await?;
    Ok(Json(response))
}

/// Confirm an email address with the emailed token
#[utoipa::path(
    get,
    path = "/api/auth/verify-email/{token}",
    params(("token" = String, Path, description = "Verification token from the email")),
    responses(
        (status = 200, description = "Email verified", body = VerifyEmailResponse),
        (status = 400, description = "Invalid or expired verification token", body = ErrorBody)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<VerifyEmailResponse>, AppError> {
    let response = state.auth.verify_email(&token).await?;
    Ok(Json(response))
}

/// Send a fresh verification email to the caller
#[utoipa::path(
    post,
    path = "/api/auth/resend-verification",
    responses(
        (status = 200, description = "Verification email sent", body = MessageResponse),
        (status = 400, description = "Email already verified", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 429, description = "Too many email requests")
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn resend_verification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let response = state.auth.resend_verification(&user).await?;
    Ok(Json(response))
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorBody),
        (status = 429, description = "Too many email requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = state.auth.forgot_password(dto).await?;
    Ok(Json(response))
}

/// Choose a new password with the emailed reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    params(("token" = String, Path, description = "Reset token from the email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired reset token", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = state.auth.reset_password(&token, dto).await?;
    Ok(Json(response))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.auth.get_profile(user.id).await?;
    Ok(Json(profile))
}

/// Update the caller's profile; returns a rotated session token
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 400, description = "Email already in use", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, user, dto), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth.update_profile(user.id, dto).await?;
    Ok(Json(response))
}

/// Update notification preferences; absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/api/auth/preferences",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated", body = PreferencesResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdatePreferencesRequest>,
) -> Result<Json<PreferencesResponse>, AppError> {
    let response = state.auth.update_preferences(user.id, dto).await?;
    Ok(Json(response))
}
