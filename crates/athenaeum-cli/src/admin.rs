use athenaeum_db::{StoreError, UserStore};
use athenaeum_models::{Role, User, normalize_email};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("no account found for {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Whether a command had anything to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

async fn find(users: &dyn UserStore, email: &str) -> Result<User, AdminError> {
    let email = normalize_email(email);
    users
        .find_by_email(&email)
        .await?
        .ok_or(AdminError::NotFound(email))
}

/// Promotes an existing account to the `admin` role.
pub async fn make_admin(
    users: &dyn UserStore,
    email: &str,
    now: DateTime<Utc>,
) -> Result<(User, Outcome), AdminError> {
    let user = find(users, email).await?;
    if user.is_admin() {
        return Ok((user, Outcome::Unchanged));
    }

    let user = users
        .set_role(user.id, Role::Admin, now)
        .await?
        .ok_or(AdminError::NotFound(user.email))?;
    Ok((user, Outcome::Changed))
}

/// Activates or deactivates an account by email.
pub async fn set_active(
    users: &dyn UserStore,
    email: &str,
    is_active: bool,
    now: DateTime<Utc>,
) -> Result<(User, Outcome), AdminError> {
    let user = find(users, email).await?;
    if user.is_active == is_active {
        return Ok((user, Outcome::Unchanged));
    }

    let user = users
        .set_active(user.id, is_active, now)
        .await?
        .ok_or(AdminError::NotFound(user.email))?;
    Ok((user, Outcome::Changed))
}
