//! Request and response bodies for the auth endpoints.
//!
//! Field names are camelCase on the wire. Request bodies are checked with
//! `validator` before they reach a handler; a failure becomes a 422.

use std::borrow::Cow;

use athenaeum_core::serde::{
    deserialize_optional_string, deserialize_optional_trimmed, deserialize_trimmed,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::levels::Level;
use crate::users::{Preferences, UserProfile};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// At least six characters with at least one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::new("password_policy").with_message(Cow::Borrowed(
            "Password must be at least 6 characters and contain a number",
        )));
    }
    Ok(())
}

pub fn validate_level(level: &str) -> Result<(), ValidationError> {
    level.parse::<Level>().map(|_| ()).map_err(|_| {
        ValidationError::new("level").with_message(Cow::Borrowed(
            "Level must be one of L100, L200, L300, L400, MASTERS, PHD",
        ))
    })
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_not_blank", message = "Student ID is required"))]
    #[schema(example = "8190340012")]
    pub student_id: String,
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "ama.mensah@st.uew.edu.gh")]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    #[schema(example = "secret123")]
    pub password: String,
    #[validate(custom(function = "validate_not_blank", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "validate_not_blank", message = "Last name is required"))]
    pub last_name: String,
    #[validate(custom(function = "validate_level"))]
    #[schema(example = "L200")]
    pub level: String,
    #[validate(custom(function = "validate_not_blank", message = "Program is required"))]
    #[schema(example = "BSc Computer Science")]
    pub program: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "ama.mensah@st.uew.edu.gh")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "ama.mensah@st.uew.edu.gh")]
    pub email: String,
}

/// The token travels in the path.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "validate_password"))]
    #[schema(example = "newSecret456")]
    pub password: String,
}

/// Partial profile update. Blank strings mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub program: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(custom(function = "validate_password"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub email_notifications: Option<bool>,
    pub new_resource_alerts: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

/// Session token plus the caller's profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    pub id: Uuid,
    pub email: String,
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyEmailResponse {
    pub message: String,
    pub user: VerifiedUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreferencesResponse {
    pub message: String,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LevelAccessResponse {
    pub level: Level,
    pub allowed: bool,
}
