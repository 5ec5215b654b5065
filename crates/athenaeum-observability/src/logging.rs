use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_DIR: &str = "storage/logs";

/// Logs one line when a request arrives and one when it completes.
///
/// The completion line is `warn` for 4xx and `error` for 5xx. Only the
/// matched route is logged, so path tokens (verification and reset links)
/// never reach the logs.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "<unmatched>".to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id, method = %method, path = %path,
            status, latency_ms, "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id, method = %method, path = %path,
            status, latency_ms, "Server error"
        ),
        _ => info!(
            request_id = %request_id, method = %method, path = %path,
            status, latency_ms, "Request completed"
        ),
    }

    response
}

fn init_tracer() -> Result<Tracer, TraceError> {
    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, "athenaeum"),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new(
            "environment",
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        ),
    ]);

    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(otlp_endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)
}

/// Installs the global subscriber: console, daily error log, daily JSON log,
/// and an OTLP exporter when one can be built.
pub fn init_tracing() -> anyhow::Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    std::fs::create_dir_all(LOG_DIR)?;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("athenaeum=info,athenaeum_db=info,tower_http=warn,hyper=info,tonic=info")
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "athenaeum.log"))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    // Structured logs for ingestion (Loki etc.)
    let json_layer = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "athenaeum.json"))
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    match init_tracer() {
        Ok(tracer) => {
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .with(json_layer)
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;

            info!("Tracing initialized with OpenTelemetry and file logging");
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .with(json_layer)
                .try_init()?;

            warn!(error = %e, "OpenTelemetry unavailable, tracing to console and files only");
        }
    }

    Ok(())
}

pub async fn shutdown_tracer() {
    info!("Shutting down OpenTelemetry tracer...");
    global::shutdown_tracer_provider();
}
