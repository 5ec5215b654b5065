//! User identity records.
//!
//! [`User`] is the persisted credential record and is deliberately not
//! `Serialize`: everything that leaves the API goes through [`UserProfile`],
//! which has no password or token fields.

use std::fmt;
use std::str::FromStr;

use athenaeum_core::PasswordHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::levels::Level;

/// Trims and lower-cases an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role '{0}'")]
pub struct ParseRoleError(pub String);

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Notification preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub email_notifications: bool,
    pub new_resource_alerts: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            new_resource_alerts: true,
        }
    }
}

impl Preferences {
    /// Absent fields are left unchanged.
    pub fn merge(&mut self, email_notifications: Option<bool>, new_resource_alerts: Option<bool>) {
        if let Some(value) = email_notifications {
            self.email_notifications = value;
        }
        if let Some(value) = new_resource_alerts {
            self.new_resource_alerts = value;
        }
    }
}

/// An outstanding email verification grant.
///
/// Token and expiry are always present together; "no active token" is
/// `None` on the owning [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    /// SHA-256 digest of the emailed token
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Registration input after validation and normalization.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub student_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub level: Level,
    pub program: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub student_id: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub first_name: String,
    pub last_name: String,
    pub level: Level,
    pub program: String,
    pub role: Role,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub email_verification: Option<VerificationToken>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh account: active, unverified, default preferences, `user` role.
    pub fn register(
        input: NewUser,
        password_hash: PasswordHash,
        verification: VerificationToken,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: input.student_id,
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            level: input.level,
            program: input.program,
            role: Role::User,
            is_active: true,
            is_email_verified: false,
            email_verification: Some(verification),
            preferences: Preferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Marks the email verified and drops the token.
    pub fn mark_email_verified(&mut self) {
        self.is_email_verified = true;
        self.email_verification = None;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    #[schema(example = "8190340012")]
    pub student_id: String,
    #[schema(example = "ama.mensah@st.uew.edu.gh")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub level: Level,
    pub program: String,
    pub role: Role,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            student_id: user.student_id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            level: user.level,
            program: user.program.clone(),
            role: user.role,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            preferences: user.preferences,
            created_at: user.created_at,
        }
    }
}
