use athenaeum_core::ErrorBody;
use athenaeum_models::{
    AuthResponse, ForgotPasswordRequest, Level, LevelAccessResponse, LoginRequest,
    MessageResponse, Preferences, PreferencesResponse, RegisterRequest, ResetPasswordRequest,
    Role, UpdatePreferencesRequest, UpdateProfileRequest, UpdateStatusRequest, UserProfile,
    VerifiedUser, VerifyEmailResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::verify_email,
        crate::modules::auth::controller::resend_verification,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::update_profile,
        crate::modules::auth::controller::update_preferences,
        crate::modules::users::controller::update_user_status,
        crate::modules::access::controller::check_level_access,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UpdateProfileRequest,
            UpdatePreferencesRequest,
            UpdateStatusRequest,
            AuthResponse,
            VerifyEmailResponse,
            VerifiedUser,
            PreferencesResponse,
            MessageResponse,
            LevelAccessResponse,
            UserProfile,
            Preferences,
            Level,
            Role,
            ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, email verification and password reset"),
        (name = "Users", description = "Account administration"),
        (name = "Access", description = "Level-based access checks")
    ),
    info(
        title = "Athenaeum API",
        version = "0.1.0",
        description = "Authentication and credential lifecycle for the UEW digital library.",
        contact(
            name = "Library Systems",
            email = "library@uew.edu.gh"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
