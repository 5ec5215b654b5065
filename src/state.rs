use std::sync::Arc;

use athenaeum_auth::SessionSigner;
use athenaeum_config::{
    AuthConfig, CorsConfig, DatabaseConfig, EmailConfig, JwtConfig, RateLimitConfig,
};
use athenaeum_core::{AppError, Clock, SystemClock};
use athenaeum_db::{PasswordResetStore, PgStore, UserStore, init_db_pool, run_migrations};
use tracing::{info, warn};

use crate::modules::auth::AuthService;
use crate::modules::users::UserService;
use crate::utils::email::{LogMailer, Mailer, SmtpMailer};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
}

/// Everything the HTTP layer needs from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            jwt: JwtConfig::from_env()?,
            auth: AuthConfig::from_env(),
            cors: CorsConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        })
    }
}

/// External systems the services talk to.
pub struct Collaborators {
    pub users: Arc<dyn UserStore>,
    pub resets: Arc<dyn PasswordResetStore>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: AppConfig, deps: Collaborators) -> Result<Self, AppError> {
        let sessions = Arc::new(SessionSigner::new(&config.jwt, deps.clock.clone()));
        let store_timeout = config.auth.store_timeout();

        let auth = AuthService::new(
            deps.users.clone(),
            deps.resets,
            deps.mailer,
            sessions,
            deps.clock.clone(),
            config.auth,
        )?;
        let users = UserService::new(deps.users, deps.clock, store_timeout);

        Ok(Self {
            auth: Arc::new(auth),
            users: Arc::new(users),
            cors_config: config.cors,
            rate_limit_config: config.rate_limit,
        })
    }
}

/// Connects to PostgreSQL, applies migrations and wires the services.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");
    let store = Arc::new(PgStore::new(pool));

    let email_config = EmailConfig::from_env();
    let mailer: Arc<dyn Mailer> = if email_config.enabled {
        Arc::new(SmtpMailer::new(email_config))
    } else {
        warn!("SMTP_ENABLED is false, outgoing email will only be logged");
        Arc::new(LogMailer)
    };

    AppState::new(
        config,
        Collaborators {
            users: store.clone(),
            resets: store,
            mailer,
            clock: Arc::new(SystemClock),
        },
    )
    .map_err(|e| e.error)
}
