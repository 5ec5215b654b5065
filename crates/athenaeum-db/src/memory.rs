//! In-process stores for tests.
//!
//! Every operation runs under one lock, which gives the same single-winner
//! guarantee for token consumption as the conditional updates in
//! [`PgStore`](crate::PgStore).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use athenaeum_core::PasswordHash;
use athenaeum_models::{PasswordReset, Role, User, VerificationToken};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{PasswordResetStore, ProfileChanges, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    resets: HashMap<Uuid, PasswordReset>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    latency: Arc<std::sync::RwLock<Option<Duration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every subsequent call, to exercise deadlines.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    pub async fn resets_for(&self, user_id: Uuid) -> Vec<PasswordReset> {
        let tables = self.tables.lock().await;
        let mut resets: Vec<_> = tables
            .resets
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        resets.sort_by_key(|r| r.created_at);
        resets
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    async fn pause(&self) {
        let latency = *self.latency.read().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn clashes(existing: &User, candidate: &User) -> bool {
    existing.id != candidate.id
        && (existing.email == candidate.email || existing.student_id == candidate.student_id)
}

fn touch(
    tables: &mut Tables,
    id: Uuid,
    now: DateTime<Utc>,
    apply: impl FnOnce(&mut User),
) -> Option<User> {
    let user = tables.users.get_mut(&id)?;
    apply(user);
    user.updated_at = now;
    Some(user.clone())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_identity_pair(
        &self,
        email: &str,
        student_id: &str,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email || u.student_id == student_id)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.pause().await;
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        if tables.users.contains_key(&user.id) || tables.users.values().any(|u| clashes(u, user)) {
            return Err(StoreError::Duplicate);
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Duplicate);
            }
        }

        Ok(touch(&mut tables, id, now, |user| {
            if let Some(email) = &changes.email {
                user.email = email.clone();
            }
            if let Some(first_name) = &changes.first_name {
                user.first_name = first_name.clone();
            }
            if let Some(last_name) = &changes.last_name {
                user.last_name = last_name.clone();
            }
            if let Some(program) = &changes.program {
                user.program = program.clone();
            }
            if let Some(hash) = &changes.password_hash {
                user.password_hash = hash.clone();
            }
        }))
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        email_notifications: Option<bool>,
        new_resource_alerts: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        Ok(touch(&mut tables, id, now, |user| {
            user.preferences.merge(email_notifications, new_resource_alerts)
        }))
    }

    async fn replace_verification(
        &self,
        id: Uuid,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        if tables.users.get(&id).is_some_and(|u| u.is_email_verified) {
            return Ok(None);
        }
        Ok(touch(&mut tables, id, now, |user| {
            user.email_verification = Some(token.clone())
        }))
    }

    async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        Ok(touch(&mut tables, id, now, |user| user.is_active = is_active))
    }

    async fn set_role(
        &self,
        id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        Ok(touch(&mut tables, id, now, |user| user.role = role))
    }

    async fn consume_verification(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        let user = tables.users.values_mut().find(|u| {
            u.email_verification
                .as_ref()
                .is_some_and(|t| t.digest == token_digest && t.is_usable(now))
        });

        Ok(user.map(|user| {
            user.mark_email_verified();
            user.updated_at = now;
            user.clone()
        }))
    }
}

#[async_trait]
impl PasswordResetStore for MemoryStore {
    async fn create(&self, reset: &PasswordReset) -> Result<(), StoreError> {
        self.pause().await;
        self.tables
            .lock()
            .await
            .resets
            .insert(reset.id, reset.clone());
        Ok(())
    }

    async fn redeem(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
        new_hash: &PasswordHash,
    ) -> Result<Option<Uuid>, StoreError> {
        self.pause().await;
        let mut tables = self.tables.lock().await;
        let Tables { users, resets } = &mut *tables;

        let Some(reset) = resets
            .values_mut()
            .find(|r| r.token_digest == token_digest && r.is_valid(now))
        else {
            return Ok(None);
        };
        let Some(user) = users.get_mut(&reset.user_id) else {
            return Ok(None);
        };

        reset.used = true;
        user.password_hash = new_hash.clone();
        user.updated_at = now;
        Ok(Some(user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use athenaeum_core::PasswordHasher;
    use athenaeum_models::{Level, NewUser, VerificationToken};
    use chrono::Duration as ChronoDuration;

    fn user(email: &str, student_id: &str, now: DateTime<Utc>) -> User {
        User::register(
            NewUser {
                student_id: student_id.into(),
                email: email.into(),
                first_name: "Kofi".into(),
                last_name: "Boateng".into(),
                level: Level::L300,
                program: "BEd Mathematics".into(),
            },
            PasswordHash::from_stored("$2b$04$placeholder".into()),
            VerificationToken {
                digest: format!("verify-{}", student_id),
                expires_at: now + ChronoDuration::hours(24),
            },
            now,
        )
    }

    #[tokio::test]
    async fn create_enforces_unique_email_and_student_id() {
        let store = MemoryStore::new();
        let now = Utc::now();
        UserStore::create(&store, &user("a@uew.edu.gh", "1", now)).await.unwrap();

        let dup_email = UserStore::create(&store, &user("a@uew.edu.gh", "2", now)).await;
        assert!(matches!(dup_email, Err(StoreError::Duplicate)));

        let dup_student = UserStore::create(&store, &user("b@uew.edu.gh", "1", now)).await;
        assert!(matches!(dup_student, Err(StoreError::Duplicate)));

        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn profile_update_rejects_email_taken_by_another_user() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let a = user("a@uew.edu.gh", "1", now);
        let b = user("b@uew.edu.gh", "2", now);
        UserStore::create(&store, &a).await.unwrap();
        UserStore::create(&store, &b).await.unwrap();

        let changes = ProfileChanges {
            email: Some("a@uew.edu.gh".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_profile(b.id, &changes, now).await,
            Err(StoreError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn profile_update_leaves_other_columns_alone() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let u = user("a@uew.edu.gh", "1", now);
        UserStore::create(&store, &u).await.unwrap();

        let reset = PasswordReset::new(u.id, "reset-digest".into(), now + ChronoDuration::hours(1), now);
        PasswordResetStore::create(&store, &reset).await.unwrap();
        let hash = PasswordHash::from_stored("$2b$04$rotated".into());
        store.redeem("reset-digest", now, &hash).await.unwrap();

        let changes = ProfileChanges {
            first_name: Some("Kwabena".into()),
            ..Default::default()
        };
        let later = now + ChronoDuration::minutes(1);
        let updated = store.update_profile(u.id, &changes, later).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Kwabena");
        assert_eq!(updated.password_hash, hash);
        assert_eq!(updated.updated_at, later);

        let updated = store
            .update_preferences(u.id, Some(false), None, later)
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.preferences.email_notifications);
        assert!(updated.preferences.new_resource_alerts);
        assert_eq!(updated.password_hash, hash);
        assert_eq!(updated.first_name, "Kwabena");
    }

    #[tokio::test]
    async fn updates_report_missing_user() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let id = Uuid::new_v4();

        assert!(store.set_active(id, false, now).await.unwrap().is_none());
        assert!(store.set_role(id, Role::Admin, now).await.unwrap().is_none());
        assert!(store.update_preferences(id, Some(true), None, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replacing_verification_skips_verified_user() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let u = user("a@uew.edu.gh", "1", now);
        UserStore::create(&store, &u).await.unwrap();

        let fresh = VerificationToken {
            digest: "verify-again".into(),
            expires_at: now + ChronoDuration::hours(24),
        };
        let pending = store.replace_verification(u.id, &fresh, now).await.unwrap().unwrap();
        assert_eq!(pending.email_verification, Some(fresh.clone()));

        store.consume_verification("verify-again", now).await.unwrap().unwrap();
        assert!(store.replace_verification(u.id, &fresh, now).await.unwrap().is_none());

        let stored = store.find_by_id(u.id).await.unwrap().unwrap();
        assert!(stored.is_email_verified);
        assert!(stored.email_verification.is_none());
    }

    #[tokio::test]
    async fn verification_is_consumed_once() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let u = user("a@uew.edu.gh", "1", now);
        UserStore::create(&store, &u).await.unwrap();

        let verified = store.consume_verification("verify-1", now).await.unwrap().unwrap();
        assert!(verified.is_email_verified);
        assert!(verified.email_verification.is_none());

        assert!(store.consume_verification("verify-1", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_verification_is_not_consumed() {
        let store = MemoryStore::new();
        let now = Utc::now();
        UserStore::create(&store, &user("a@uew.edu.gh", "1", now)).await.unwrap();

        let later = now + ChronoDuration::hours(25);
        assert!(store.consume_verification("verify-1", later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn redeem_is_single_use() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let u = user("a@uew.edu.gh", "1", now);
        UserStore::create(&store, &u).await.unwrap();

        let reset = PasswordReset::new(u.id, "reset-digest".into(), now + ChronoDuration::hours(1), now);
        PasswordResetStore::create(&store, &reset).await.unwrap();

        let hasher = PasswordHasher::new(4).unwrap();
        let hash = hasher.hash("newpass1").unwrap();

        assert_eq!(store.redeem("reset-digest", now, &hash).await.unwrap(), Some(u.id));
        assert_eq!(store.redeem("reset-digest", now, &hash).await.unwrap(), None);

        let stored = store.find_by_id(u.id).await.unwrap().unwrap();
        assert!(hasher.verify("newpass1", &stored.password_hash));
    }
}
