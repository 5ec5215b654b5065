use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

pub use metrics_exporter_prometheus::PrometheusHandle;

use crate::switch::is_observability_enabled;

/// Installs the Prometheus recorder and its upkeep task.
///
/// Returns `Ok(None)` when observability is switched off.
pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    // Matched route only; raw paths would carry single-use tokens.
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "<unmatched>".to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    gauge!("http_requests_active").decrement(1.0);

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Credential lifecycle counters

pub fn track_registration() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_registrations_total").increment(1);
}

pub fn track_login_success() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_logins_total", "status" => "success").increment(1);
}

/// `reason` is internal only; callers always see the same generic error.
pub fn track_login_failure(reason: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_logins_total", "status" => "failure", "reason" => reason.to_string())
        .increment(1);
}

pub fn track_session_issued(reason: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_sessions_issued_total", "reason" => reason.to_string()).increment(1);
}

pub fn track_email_verified() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_email_verifications_total").increment(1);
}

pub fn track_password_reset(outcome: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_password_resets_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn track_mail_dispatch(kind: &str, success: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "sent" } else { "failed" };
    counter!("mail_dispatch_total", "kind" => kind.to_string(), "status" => status).increment(1);
}
