//! Issuing and verifying session tokens.
//!
//! Expiry is checked against the injected clock rather than the system time
//! `jsonwebtoken` would use, so tests can simulate a token aging past its
//! validity window.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use athenaeum_config::JwtConfig;
use athenaeum_core::{AppError, Clock};

use crate::claims::SessionClaims;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session token signature does not match")]
    InvalidSignature,
    #[error("session token has expired")]
    Expired,
    #[error("session token is malformed")]
    Malformed,
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Signing(_) => AppError::internal(err),
            _ => AppError::invalid_token(),
        }
    }
}

#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("validity", &self.validity)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            validity: Duration::seconds(config.session_expiry_secs),
            clock,
        }
    }

    /// Signs a token for `user_id` expiring one validity window from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String, SessionError> {
        let now = self.clock.now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Checks signature then expiry, returning the embedded user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, SessionError> {
        let claims = decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => SessionError::InvalidSignature,
                kind => {
                    debug!(?kind, "rejecting malformed session token");
                    SessionError::Malformed
                }
            })?;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(SessionError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| SessionError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use athenaeum_core::ManualClock;
    use chrono::Utc;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig::new(secret.to_string(), 30 * 24 * 60 * 60).unwrap()
    }

    fn signer_with(secret: &str) -> (SessionSigner, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (SessionSigner::new(&config(secret), clock.clone()), clock)
    }

    #[test]
    fn issued_token_resolves_to_subject() {
        let (signer, _) = signer_with("test_secret_key");
        let user_id = Uuid::new_v4();

        let token = signer.issue(user_id).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn claims_carry_thirty_day_window() {
        let (signer, clock) = signer_with("test_secret_key");
        let token = signer.issue(Uuid::new_v4()).unwrap();

        let claims = decode::<SessionClaims>(&token, &signer.decoding, &signer.validation)
            .unwrap()
            .claims;
        assert_eq!(claims.iat, clock.now().timestamp());
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn token_is_valid_until_window_elapses() {
        let (signer, clock) = signer_with("test_secret_key");
        let user_id = Uuid::new_v4();
        let token = signer.issue(user_id).unwrap();

        clock.advance(Duration::days(29));
        assert_eq!(signer.verify(&token).unwrap(), user_id);

        clock.advance(Duration::days(1) + Duration::seconds(1));
        assert_eq!(signer.verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn token_with_past_expiry_is_expired() {
        let (signer, clock) = signer_with("test_secret_key");
        clock.set(Utc::now() - Duration::days(31));
        let token = signer.issue(Uuid::new_v4()).unwrap();

        clock.set(Utc::now());
        assert_eq!(signer.verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let (signer, _) = signer_with("secret_one");
        let (other, _) = signer_with("secret_two");
        let token = signer.issue(Uuid::new_v4()).unwrap();

        assert_eq!(other.verify(&token), Err(SessionError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let (signer, _) = signer_with("test_secret_key");
        assert_eq!(signer.verify("invalid.token.here"), Err(SessionError::Malformed));
        assert_eq!(signer.verify(""), Err(SessionError::Malformed));
    }

    #[test]
    fn rotated_tokens_differ() {
        let (signer, _) = signer_with("test_secret_key");
        let user_id = Uuid::new_v4();
        assert_ne!(signer.issue(user_id).unwrap(), signer.issue(user_id).unwrap());
    }

    #[test]
    fn verification_failures_map_to_invalid_token() {
        let err: AppError = SessionError::Expired.into();
        assert_eq!(err.kind, athenaeum_core::ErrorKind::InvalidToken);
        let err: AppError = SessionError::Signing("boom".into()).into();
        assert_eq!(err.kind, athenaeum_core::ErrorKind::Internal);
    }
}
