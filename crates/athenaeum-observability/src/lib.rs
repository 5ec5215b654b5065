//! Athenaeum Observability
//!
//! Provides configurable observability features including:
//! - Tracing and distributed tracing via OpenTelemetry
//! - Metrics collection via Prometheus, including credential lifecycle counters
//! - HTTP request/response logging
//!
//! Compiled in with the `observability` feature (default). At runtime it can be
//! switched off with `OBSERVABILITY_ENABLED=false`, in which case
//! [`init_basic_console_logging`] gives plain console output and every
//! `track_*` helper is a no-op.
//!
//! # Examples
//!
//! ```no_run
//! use athenaeum_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     init_tracing()?;
//!     // ... application code ...
//!     shutdown_tracer().await;
//!     Ok(())
//! }
//! ```

pub mod basic_logging;
pub mod switch;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;
pub use switch::is_observability_enabled;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    PrometheusHandle, init_metrics, metrics_app, metrics_middleware, track_email_verified,
    track_login_failure, track_login_success, track_mail_dispatch, track_password_reset,
    track_registration, track_session_issued,
};

// No-op stubs when observability is compiled out
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    /// Stand-in for the Prometheus handle.
    #[derive(Clone, Debug)]
    pub struct PrometheusHandle;

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_tracing() -> anyhow::Result<()> {
        crate::basic_logging::init_basic_console_logging();
        Ok(())
    }

    pub async fn shutdown_tracer() {}

    pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
        Ok(None)
    }

    pub fn metrics_app(_handle: PrometheusHandle) -> Router {
        Router::new()
    }

    pub fn track_registration() {}
    pub fn track_login_success() {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_session_issued(_reason: &str) {}
    pub fn track_email_verified() {}
    pub fn track_password_reset(_outcome: &str) {}
    pub fn track_mail_dispatch(_kind: &str, _success: bool) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
