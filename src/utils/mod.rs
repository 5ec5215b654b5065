//! Shared utilities.
//!
//! - [`email`]: the [`Mailer`](email::Mailer) seam, SMTP delivery and test doubles

pub mod email;
