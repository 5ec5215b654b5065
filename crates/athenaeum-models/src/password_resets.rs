use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A one-time password reset grant.
///
/// Several may be outstanding for one user; each is consumed independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 digest of the emailed token
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(
        user_id: Uuid,
        token_digest: String,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_digest,
            expires_at,
            used: false,
            created_at: now,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn valid_only_while_unused_and_unexpired() {
        let now = Utc::now();
        let mut reset = PasswordReset::new(Uuid::new_v4(), "d".into(), now + Duration::hours(1), now);

        assert!(reset.is_valid(now));
        assert!(!reset.is_valid(now + Duration::hours(1)));

        reset.used = true;
        assert!(!reset.is_valid(now));
    }
}
