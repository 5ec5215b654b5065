//! # Athenaeum Models
//!
//! Domain models and DTOs for the Athenaeum API.
//!
//! # Modules
//!
//! - [`levels`]: the academic level hierarchy (L100 through PHD)
//! - [`users`]: user identity records, roles, preferences and the public profile
//! - [`password_resets`]: one-time password reset grants
//! - [`auth`]: request and response bodies for the auth endpoints
//!
//! # Example
//!
//! ```ignore
//! use athenaeum_models::{Level, User, UserProfile};
//!
//! assert!(Level::Phd > Level::L100);
//! let profile = UserProfile::from(&user);
//! ```

pub mod auth;
pub mod levels;
pub mod password_resets;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{
    AuthResponse, ForgotPasswordRequest, LevelAccessResponse, LoginRequest, MessageResponse,
    PreferencesResponse, RegisterRequest, ResetPasswordRequest, UpdatePreferencesRequest,
    UpdateProfileRequest, UpdateStatusRequest, VerifiedUser, VerifyEmailResponse,
};
pub use levels::{Level, ParseLevelError};
pub use password_resets::PasswordReset;
pub use users::{
    NewUser, ParseRoleError, Preferences, Role, User, UserProfile, VerificationToken,
    normalize_email,
};
