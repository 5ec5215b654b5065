//! PostgreSQL-backed stores.

use async_trait::async_trait;
use athenaeum_core::PasswordHash;
use athenaeum_models::{PasswordReset, Preferences, Role, User, VerificationToken};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{PasswordResetStore, ProfileChanges, UserStore};

const USER_COLUMNS: &str = "id, student_id, email, password_hash, first_name, last_name, level, \
     program, role, is_active, is_email_verified, email_verification_token, \
     email_verification_expires, email_notifications, new_resource_alerts, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    student_id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    level: String,
    program: String,
    role: String,
    is_active: bool,
    is_email_verified: bool,
    email_verification_token: Option<String>,
    email_verification_expires: Option<DateTime<Utc>>,
    email_notifications: bool,
    new_resource_alerts: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let level = row
            .level
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {}", row.id, e)))?;
        let role = row
            .role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {}", row.id, e)))?;

        // A token without its expiry is never usable.
        let email_verification = match (row.email_verification_token, row.email_verification_expires) {
            (Some(digest), Some(expires_at)) => Some(VerificationToken { digest, expires_at }),
            _ => None,
        };

        Ok(User {
            id: row.id,
            student_id: row.student_id,
            email: row.email,
            password_hash: PasswordHash::from_stored(row.password_hash),
            first_name: row.first_name,
            last_name: row.last_name,
            level,
            program: row.program,
            role,
            is_active: row.is_active,
            is_email_verified: row.is_email_verified,
            email_verification,
            preferences: Preferences {
                email_notifications: row.email_notifications,
                new_resource_alerts: row.new_resource_alerts,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(
        &self,
        filter: &str,
        binds: &[&str],
    ) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, filter);
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for value in binds {
            query = query.bind(*value);
        }
        query
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("email = $1", &[email]).await
    }

    #[instrument(skip(self))]
    async fn find_by_identity_pair(
        &self,
        email: &str,
        student_id: &str,
    ) -> Result<Option<User>, StoreError> {
        self.fetch_user("email = $1 OR student_id = $2 LIMIT 1", &[email, student_id])
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let (token, expires) = verification_columns(user);
        sqlx::query(
            "INSERT INTO users (id, student_id, email, password_hash, first_name, last_name, \
             level, program, role, is_active, is_email_verified, email_verification_token, \
             email_verification_expires, email_notifications, new_resource_alerts, created_at, \
             updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(user.id)
        .bind(&user.student_id)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.level.as_str())
        .bind(&user.program)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.is_email_verified)
        .bind(token)
        .bind(expires)
        .bind(user.preferences.email_notifications)
        .bind(user.preferences.new_resource_alerts)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, changes))]
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET email = COALESCE($2, email), \
             first_name = COALESCE($3, first_name), last_name = COALESCE($4, last_name), \
             program = COALESCE($5, program), password_hash = COALESCE($6, password_hash), \
             updated_at = $7 \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.email.as_deref())
            .bind(changes.first_name.as_deref())
            .bind(changes.last_name.as_deref())
            .bind(changes.program.as_deref())
            .bind(changes.password_hash.as_ref().map(PasswordHash::as_str))
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn update_preferences(
        &self,
        id: Uuid,
        email_notifications: Option<bool>,
        new_resource_alerts: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET email_notifications = COALESCE($2, email_notifications), \
             new_resource_alerts = COALESCE($3, new_resource_alerts), updated_at = $4 \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(email_notifications)
            .bind(new_resource_alerts)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self, token))]
    async fn replace_verification(
        &self,
        id: Uuid,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET email_verification_token = $2, email_verification_expires = $3, \
             updated_at = $4 \
             WHERE id = $1 AND is_email_verified = FALSE \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&token.digest)
            .bind(token.expires_at)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(is_active)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn set_role(
        &self,
        id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(role.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self, token_digest))]
    async fn consume_verification(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET is_email_verified = TRUE, email_verification_token = NULL, \
             email_verification_expires = NULL, updated_at = $2 \
             WHERE email_verification_token = $1 AND email_verification_expires > $2 \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(token_digest)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

fn verification_columns(user: &User) -> (Option<&str>, Option<DateTime<Utc>>) {
    match &user.email_verification {
        Some(token) => (Some(token.digest.as_str()), Some(token.expires_at)),
        None => (None, None),
    }
}

#[async_trait]
impl PasswordResetStore for PgStore {
    #[instrument(skip(self, reset), fields(user_id = %reset.user_id))]
    async fn create(&self, reset: &PasswordReset) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO password_resets (id, user_id, token_digest, expires_at, used, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(reset.id)
        .bind(reset.user_id)
        .bind(&reset.token_digest)
        .bind(reset.expires_at)
        .bind(reset.used)
        .bind(reset.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, token_digest, new_hash))]
    async fn redeem(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
        new_hash: &PasswordHash,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here makes a concurrent redeem of the same token
        // wait, then re-check `used = FALSE` and match nothing.
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE password_resets SET used = TRUE \
             WHERE token_digest = $1 AND used = FALSE AND expires_at > $2 \
             RETURNING user_id",
        )
        .bind(token_digest)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        let updated =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
                .bind(new_hash.as_str())
                .bind(now)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(user_id))
    }
}
