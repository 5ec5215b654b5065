//! # Athenaeum Config
//!
//! Configuration types for the Athenaeum API, each loaded from environment
//! variables through a `from_env()` constructor:
//!
//! - [`jwt`]: session token signing secret and validity window
//! - [`auth`]: password hashing cost, single-use token lifetimes, store deadline
//! - [`database`]: PostgreSQL connection settings
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`email`]: Email/SMTP configuration
//! - [`rate_limit`]: per-route rate limiting configuration
//! - [`server`]: listener addresses
//!
//! # Example
//!
//! ```ignore
//! use athenaeum_config::{AuthConfig, JwtConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env()?; // fails without JWT_SECRET
//! let auth_config = AuthConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod server;

mod env;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
