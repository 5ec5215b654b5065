//! # Athenaeum CLI
//!
//! Account administration that has no HTTP surface.
//!
//! The operations work against any [`UserStore`](athenaeum_db::UserStore), so
//! the binary runs them against PostgreSQL and tests against the in-memory
//! store.
//!
//! ## Usage
//!
//! ```ignore
//! use athenaeum_cli::admin::make_admin;
//!
//! let (user, outcome) = make_admin(&store, "librarian@uew.edu.gh", Utc::now()).await?;
//! ```

pub mod admin;
