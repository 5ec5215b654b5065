//! Middleware and extractors for request processing.
//!
//! # Modules
//!
//! - [`auth`]: the [`AuthUser`](auth::AuthUser) extractor that resolves a bearer
//!   session token to an active account
//! - [`role`]: admin-only middleware and the level hierarchy check
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` verifies the token and loads the account
//! 3. Role or level checks run against that account
//! 4. Handler receives the account as a parameter and passes it on
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::check_level;
//!
//! async fn open_resource(
//!     AuthUser(user): AuthUser,
//!     Path(id): Path<Uuid>,
//! ) -> Result<impl IntoResponse, AppError> {
//!     let resource = load(id).await?;
//!     check_level(&user, resource.level)?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod role;
