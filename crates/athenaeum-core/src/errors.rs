//! Application error taxonomy.
//!
//! Every failure that can leave the API is an [`AppError`]: a typed
//! [`ErrorKind`] that decides the HTTP status and the stable machine-readable
//! reason, plus an [`anyhow::Error`] carrying the human-readable message (or,
//! for infrastructure failures, the underlying cause that is logged but never
//! serialized).
//!
//! # Response shape
//!
//! ```json
//! { "error": "invalid_credentials", "message": "Invalid email or password" }
//! ```

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Discriminates every failure the API can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateIdentity,
    /// Merges unknown email, inactive account and wrong password.
    InvalidCredentials,
    AccountDeactivated,
    /// Merges unknown, expired and already-consumed single-use tokens.
    InvalidOrExpiredToken,
    AlreadyVerified,
    Forbidden,
    InsufficientLevel,
    NoToken,
    InvalidToken,
    UserNotFound,
    NotFound,
    BadRequest,
    Validation,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::DuplicateIdentity
            | ErrorKind::InvalidOrExpiredToken
            | ErrorKind::AlreadyVerified
            | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidCredentials
            | ErrorKind::AccountDeactivated
            | ErrorKind::NoToken
            | ErrorKind::InvalidToken
            | ErrorKind::UserNotFound => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden | ErrorKind::InsufficientLevel => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable reason string sent as the `error` field.
    pub fn reason(self) -> &'static str {
        match self {
            ErrorKind::DuplicateIdentity => "duplicate_identity",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::AccountDeactivated => "account_deactivated",
            ErrorKind::InvalidOrExpiredToken => "invalid_or_expired_token",
            ErrorKind::AlreadyVerified => "already_verified",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InsufficientLevel => "insufficient_level",
            ErrorKind::NoToken => "no_token",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::UserNotFound => "user_not_found",
            ErrorKind::NotFound => "not_found",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Validation => "validation_failed",
            ErrorKind::Unavailable => "service_unavailable",
            ErrorKind::Internal => "internal_error",
        }
    }

    /// Infrastructure failures whose cause must stay server-side.
    pub fn is_opaque(self) -> bool {
        matches!(self, ErrorKind::Unavailable | ErrorKind::Internal)
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable reason, e.g. `invalid_credentials`
    #[schema(example = "invalid_credentials")]
    pub error: String,
    /// Human-readable explanation
    #[schema(example = "Invalid email or password")]
    pub message: String,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn duplicate_identity() -> Self {
        Self::new(
            ErrorKind::DuplicateIdentity,
            anyhow!("User already exists with this email or student ID"),
        )
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorKind::InvalidCredentials,
            anyhow!("Invalid email or password"),
        )
    }

    pub fn account_deactivated() -> Self {
        Self::new(ErrorKind::AccountDeactivated, anyhow!("Account is deactivated"))
    }

    pub fn invalid_or_expired_token(message: &str) -> Self {
        Self::new(ErrorKind::InvalidOrExpiredToken, anyhow!("{}", message))
    }

    pub fn already_verified() -> Self {
        Self::new(ErrorKind::AlreadyVerified, anyhow!("Email is already verified"))
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(ErrorKind::Forbidden, anyhow!("{}", message))
    }

    pub fn insufficient_level() -> Self {
        Self::new(
            ErrorKind::InsufficientLevel,
            anyhow!("Access denied. This resource requires a higher level"),
        )
    }

    pub fn no_token() -> Self {
        Self::new(ErrorKind::NoToken, anyhow!("Not authorized, no token"))
    }

    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::InvalidToken, anyhow!("Not authorized, token failed"))
    }

    pub fn user_not_found() -> Self {
        Self::new(ErrorKind::UserNotFound, anyhow!("User not found"))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::BadRequest, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn unavailable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Unavailable, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::Unavailable => "Service temporarily unavailable".to_string(),
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.error.to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind.reason().to_string(),
            message: self.public_message(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.reason(), self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind.is_opaque() {
            tracing::error!(kind = self.kind.reason(), error = ?self.error, "request failed");
        }

        (self.kind.status(), Json(self.body())).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::internal(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_login_failures_share_status_and_reason() {
        let err = AppError::invalid_credentials();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.body().error, "invalid_credentials");
        assert_eq!(err.body().message, "Invalid email or password");
    }

    #[test]
    fn gate_rejections_are_unauthorized() {
        for err in [
            AppError::no_token(),
            AppError::invalid_token(),
            AppError::user_not_found(),
            AppError::account_deactivated(),
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn authorization_rejections_are_forbidden() {
        assert_eq!(AppError::forbidden("nope").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::insufficient_level().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn infrastructure_errors_hide_their_cause() {
        let err = AppError::unavailable(anyhow!("connection refused at 10.0.0.3:5432"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.body().message.contains("10.0.0.3"));

        let err = AppError::internal(anyhow!("secret detail"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().message, "Internal server error");
    }

    #[test]
    fn precise_errors_keep_their_message() {
        let err = AppError::bad_request(anyhow!("You cannot deactivate your own account"));
        assert_eq!(err.body().error, "bad_request");
        assert_eq!(err.body().message, "You cannot deactivate your own account");
    }

    #[test]
    fn validation_maps_to_422() {
        assert_eq!(
            AppError::unprocessable(anyhow!("bad")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
