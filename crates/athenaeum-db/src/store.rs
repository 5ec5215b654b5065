use async_trait::async_trait;
use athenaeum_core::PasswordHash;
use athenaeum_models::{PasswordReset, Role, User, VerificationToken};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;

/// Profile columns to overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    /// Must already be normalized.
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub program: Option<String>,
    pub password_hash: Option<PasswordHash>,
}

/// Persisted user identity records.
///
/// Email and student id are each globally unique; [`create`](Self::create)
/// and [`update_profile`](Self::update_profile) report a clash as
/// [`StoreError::Duplicate`].
///
/// Updates touch only the columns they name, so concurrent writers of
/// different fields never undo each other. Every update returns the user as
/// stored afterwards, or `None` when no row matched.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Any user holding this email or this student id.
    async fn find_by_identity_pair(
        &self,
        email: &str,
        student_id: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn create(&self, user: &User) -> Result<(), StoreError>;

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Merges the given notification flags into the stored preferences.
    async fn update_preferences(
        &self,
        id: Uuid,
        email_notifications: Option<bool>,
        new_resource_alerts: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Replaces the pending verification token. Matches only while the
    /// email is still unverified.
    async fn replace_verification(
        &self,
        id: Uuid,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    async fn set_role(
        &self,
        id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Marks the owner of an unexpired verification token verified and clears
    /// the token, returning the updated user. At most one caller per token
    /// gets `Some`.
    async fn consume_verification(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;
}

/// One-time password reset grants.
#[async_trait]
pub trait PasswordResetStore: Send + Sync {
    async fn create(&self, reset: &PasswordReset) -> Result<(), StoreError>;

    /// Consumes a valid grant and stores `new_hash` on its owner as one
    /// atomic step, returning the owner's id. Racing callers with the same
    /// token see exactly one `Some`.
    async fn redeem(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
        new_hash: &PasswordHash,
    ) -> Result<Option<Uuid>, StoreError>;
}
