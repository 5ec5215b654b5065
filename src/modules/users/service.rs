use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use athenaeum_core::{AppError, Clock, with_deadline};
use athenaeum_db::UserStore;
use athenaeum_models::{User, UserProfile};
use tracing::{info, instrument};
use uuid::Uuid;

/// Account administration.
pub struct UserService {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>, store_timeout: Duration) -> Self {
        Self {
            users,
            clock,
            store_timeout,
        }
    }

    /// Activates or deactivates an account. A deactivated account can neither
    /// log in nor use an existing session.
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn set_active(
        &self,
        admin: &User,
        target_id: Uuid,
        is_active: bool,
    ) -> Result<UserProfile, AppError> {
        if target_id == admin.id && !is_active {
            return Err(AppError::bad_request(anyhow!(
                "You cannot deactivate your own account"
            )));
        }

        let mut user = with_deadline(self.store_timeout, self.users.find_by_id(target_id))
            .await?
            .ok_or_else(not_found)?;

        if user.is_active != is_active {
            user = with_deadline(
                self.store_timeout,
                self.users.set_active(target_id, is_active, self.clock.now()),
            )
            .await?
            .ok_or_else(not_found)?;
            info!(user_id = %user.id, is_active, "account status changed");
        }

        Ok(UserProfile::from(&user))
    }
}

fn not_found() -> AppError {
    AppError::not_found(anyhow!("User not found"))
}
