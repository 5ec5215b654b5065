use std::future::Future;
use std::sync::Arc;

use athenaeum_auth::SessionSigner;
use athenaeum_config::AuthConfig;
use athenaeum_core::{
    AppError, Clock, PasswordHash, PasswordHasher, TokenIssuer, digest_token, with_deadline,
};
use athenaeum_db::{PasswordResetStore, ProfileChanges, StoreError, UserStore};
use athenaeum_models::{
    AuthResponse, ForgotPasswordRequest, Level, LoginRequest, MessageResponse, NewUser,
    PasswordReset, PreferencesResponse, RegisterRequest, ResetPasswordRequest,
    UpdatePreferencesRequest, UpdateProfileRequest, User, UserProfile, VerificationToken,
    VerifiedUser, VerifyEmailResponse, normalize_email,
};
use athenaeum_observability::{
    track_email_verified, track_login_failure, track_login_success, track_mail_dispatch,
    track_password_reset, track_registration, track_session_issued,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::utils::email::{MailError, MailKind, Mailer, Recipient};

pub const REGISTERED_MESSAGE: &str =
    "Registration successful. Please check your email to verify your account.";
pub const VERIFICATION_SENT_MESSAGE: &str = "Verification email sent";
pub const EMAIL_VERIFIED_MESSAGE: &str = "Email verified successfully";
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If that email exists, a password reset link has been sent";
pub const PASSWORD_RESET_MESSAGE: &str =
    "Password reset successfully. You can now login with your new password.";
pub const PROFILE_UPDATED_MESSAGE: &str = "Profile updated successfully";
pub const PREFERENCES_UPDATED_MESSAGE: &str = "Preferences updated successfully";

const INVALID_VERIFICATION_TOKEN: &str = "Invalid or expired verification token";
const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";

/// Registration, login, verification, password reset and profile upkeep.
///
/// Every store call runs under the configured deadline. Mail is dispatched on
/// a detached task after the state change it announces has been written, and
/// its outcome is only logged.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    resets: Arc<dyn PasswordResetStore>,
    mailer: Arc<dyn Mailer>,
    sessions: Arc<SessionSigner>,
    clock: Arc<dyn Clock>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        resets: Arc<dyn PasswordResetStore>,
        mailer: Arc<dyn Mailer>,
        sessions: Arc<SessionSigner>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        Ok(Self {
            users,
            resets,
            mailer,
            sessions,
            tokens: TokenIssuer::new(clock.clone()),
            clock,
            hasher,
            config,
        })
    }

    #[instrument(skip(self, dto), fields(email = %dto.email))]
    pub async fn register(&self, dto: RegisterRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);
        let student_id = dto.student_id.trim().to_string();
        let level: Level = dto.level.parse().map_err(AppError::unprocessable)?;

        if self
            .store(self.users.find_by_identity_pair(&email, &student_id))
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_identity());
        }

        let password_hash = self.hash_password(dto.password).await?;
        let verification = self.tokens.issue(self.config.verification_ttl());

        let user = User::register(
            NewUser {
                student_id,
                email,
                first_name: dto.first_name.trim().to_string(),
                last_name: dto.last_name.trim().to_string(),
                level,
                program: dto.program.trim().to_string(),
            },
            password_hash,
            VerificationToken {
                digest: verification.digest,
                expires_at: verification.expires_at,
            },
            self.clock.now(),
        );

        // A concurrent registration can still win the unique index.
        self.store(self.users.create(&user)).await?;
        track_registration();
        info!(user_id = %user.id, "user registered");

        self.send_verification(&user, verification.plain);

        Ok(AuthResponse {
            token: self.issue_session(user.id, "register")?,
            user: UserProfile::from(&user),
            message: Some(REGISTERED_MESSAGE.to_string()),
        })
    }

    /// Unknown email, deactivated account and wrong password all fail the
    /// same way and cost one bcrypt verification each.
    #[instrument(skip(self, dto), fields(email = %dto.email))]
    pub async fn login(&self, dto: LoginRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);
        let user = self.store(self.users.find_by_email(&email)).await?;

        let Some(user) = user else {
            self.burn_verification(dto.password).await?;
            track_login_failure("unknown_email");
            return Err(AppError::invalid_credentials());
        };

        let matches = self
            .verify_password(dto.password, user.password_hash.clone())
            .await?;

        if !user.is_active {
            track_login_failure("inactive");
            return Err(AppError::invalid_credentials());
        }
        if !matches {
            track_login_failure("wrong_password");
            return Err(AppError::invalid_credentials());
        }

        track_login_success();
        Ok(AuthResponse {
            token: self.issue_session(user.id, "login")?,
            user: UserProfile::from(&user),
            message: None,
        })
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.id))]
    pub async fn resend_verification(&self, caller: &User) -> Result<MessageResponse, AppError> {
        let user = self.load_user(caller.id).await?;
        if user.is_email_verified {
            return Err(AppError::already_verified());
        }

        let verification = self.tokens.issue(self.config.verification_ttl());
        let token = VerificationToken {
            digest: verification.digest,
            expires_at: verification.expires_at,
        };
        // No match means the email was verified since it was loaded.
        let user = self
            .store(self.users.replace_verification(user.id, &token, self.clock.now()))
            .await?
            .ok_or_else(AppError::already_verified)?;

        self.send_verification(&user, verification.plain);
        Ok(MessageResponse::new(VERIFICATION_SENT_MESSAGE))
    }

    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<VerifyEmailResponse, AppError> {
        let digest = digest_token(token);
        let user = self
            .store(self.users.consume_verification(&digest, self.clock.now()))
            .await?
            .ok_or_else(|| AppError::invalid_or_expired_token(INVALID_VERIFICATION_TOKEN))?;

        track_email_verified();
        info!(user_id = %user.id, "email verified");

        Ok(VerifyEmailResponse {
            message: EMAIL_VERIFIED_MESSAGE.to_string(),
            user: VerifiedUser {
                id: user.id,
                email: user.email,
                is_email_verified: user.is_email_verified,
            },
        })
    }

    /// Always answers with the same acknowledgement.
    ///
    /// For a match the reset grant is written before answering and only the
    /// mail is left to a detached task.
    #[instrument(skip(self, dto))]
    pub async fn forgot_password(
        &self,
        dto: ForgotPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        let email = normalize_email(&dto.email);

        if let Some(user) = self.store(self.users.find_by_email(&email)).await? {
            let grant = self.tokens.issue(self.config.reset_ttl());
            let reset = PasswordReset::new(
                user.id,
                grant.digest,
                grant.expires_at,
                self.clock.now(),
            );
            self.store(self.resets.create(&reset)).await?;
            debug!(user_id = %user.id, "password reset grant stored");

            let mailer = self.mailer.clone();
            let recipient = Recipient::from(&user);
            let token = grant.plain;
            dispatch(MailKind::PasswordReset, async move {
                mailer.send_password_reset_email(&recipient, &token).await
            });
        } else {
            debug!("password reset requested for unknown email");
        }

        Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
    }

    /// Consumes the grant and replaces the password in one conditional write,
    /// so a token can succeed at most once even under concurrent submissions.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        dto: ResetPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        let digest = digest_token(token);
        let new_hash = self.hash_password(dto.password).await?;

        let Some(user_id) = self
            .store(self.resets.redeem(&digest, self.clock.now(), &new_hash))
            .await?
        else {
            track_password_reset("rejected");
            return Err(AppError::invalid_or_expired_token(INVALID_RESET_TOKEN));
        };

        track_password_reset("completed");
        info!(user_id = %user_id, "password reset");

        match self.store(self.users.find_by_id(user_id)).await {
            Ok(Some(user)) => {
                let mailer = self.mailer.clone();
                let recipient = Recipient::from(&user);
                dispatch(MailKind::PasswordResetConfirmation, async move {
                    mailer.send_password_reset_confirmation(&recipient).await
                });
            }
            Ok(None) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "skipping reset confirmation"),
        }

        Ok(MessageResponse::new(PASSWORD_RESET_MESSAGE))
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let user = self.load_user(user_id).await?;
        Ok(UserProfile::from(&user))
    }

    /// Applies the present fields and rotates the session token.
    ///
    /// Changing the email keeps the current verification status. Columns the
    /// request leaves out are not written.
    #[instrument(skip(self, dto))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        dto: UpdateProfileRequest,
    ) -> Result<AuthResponse, AppError> {
        let current = self.load_user(user_id).await?;
        let mut changes = ProfileChanges::default();

        if let Some(email) = dto.email {
            let email = normalize_email(&email);
            if email != current.email {
                let taken = self.store(self.users.find_by_email(&email)).await?;
                if taken.is_some_and(|other| other.id != current.id) {
                    return Err(AppError::duplicate_identity());
                }
                changes.email = Some(email);
            }
        }
        changes.first_name = dto.first_name.map(|v| v.trim().to_string());
        changes.last_name = dto.last_name.map(|v| v.trim().to_string());
        changes.program = dto.program.map(|v| v.trim().to_string());
        if let Some(password) = dto.password {
            changes.password_hash = Some(self.hash_password(password).await?);
        }

        let user = self
            .store(self.users.update_profile(user_id, &changes, self.clock.now()))
            .await?
            .ok_or_else(missing_user)?;

        Ok(AuthResponse {
            token: self.issue_session(user.id, "profile_update")?,
            user: UserProfile::from(&user),
            message: Some(PROFILE_UPDATED_MESSAGE.to_string()),
        })
    }

    #[instrument(skip(self))]
    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        dto: UpdatePreferencesRequest,
    ) -> Result<PreferencesResponse, AppError> {
        let user = self
            .store(self.users.update_preferences(
                user_id,
                dto.email_notifications,
                dto.new_resource_alerts,
                self.clock.now(),
            ))
            .await?
            .ok_or_else(missing_user)?;

        Ok(PreferencesResponse {
            message: PREFERENCES_UPDATED_MESSAGE.to_string(),
            preferences: user.preferences,
        })
    }

    /// Resolves a bearer token to an active account.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.sessions.verify(token).map_err(|e| {
            debug!(error = %e, "session token rejected");
            AppError::invalid_token()
        })?;

        let user = self
            .store(self.users.find_by_id(user_id))
            .await?
            .ok_or_else(AppError::user_not_found)?;

        if !user.is_active {
            return Err(AppError::account_deactivated());
        }
        Ok(user)
    }

    async fn store<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        with_deadline(self.config.store_timeout(), fut).await
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.store(self.users.find_by_id(user_id))
            .await?
            .ok_or_else(missing_user)
    }

    fn issue_session(&self, user_id: Uuid, reason: &str) -> Result<String, AppError> {
        let token = self.sessions.issue(user_id)?;
        track_session_issued(reason);
        Ok(token)
    }

    fn send_verification(&self, user: &User, token: String) {
        let mailer = self.mailer.clone();
        let recipient = Recipient::from(user);
        dispatch(MailKind::Verification, async move {
            mailer.send_verification_email(&recipient, &token).await
        });
    }

    async fn hash_password(&self, plaintext: String) -> Result<PasswordHash, AppError> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await??)
    }

    async fn verify_password(
        &self,
        plaintext: String,
        hash: PasswordHash,
    ) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash)).await?)
    }

    async fn burn_verification(&self, plaintext: String) -> Result<(), AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&plaintext)).await?;
        Ok(())
    }
}

fn missing_user() -> AppError {
    AppError::not_found(anyhow::anyhow!("User not found"))
}

fn dispatch<F>(kind: MailKind, send: F)
where
    F: Future<Output = Result<(), MailError>> + Send + 'static,
{
    tokio::spawn(async move { report_dispatch(kind, send.await) });
}

fn report_dispatch(kind: MailKind, outcome: Result<(), MailError>) {
    match outcome {
        Ok(()) => {
            info!(kind = %kind, "email dispatched");
            track_mail_dispatch(kind.as_str(), true);
        }
        Err(e) => {
            warn!(kind = %kind, error = %e, "email dispatch failed");
            track_mail_dispatch(kind.as_str(), false);
        }
    }
}
