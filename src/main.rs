use std::net::SocketAddr;

use athenaeum::router::init_router;
use athenaeum::state::init_app_state;
use athenaeum_config::ServerConfig;
use athenaeum_observability::{
    init_basic_console_logging, init_metrics, init_tracing, is_observability_enabled,
    metrics_app, shutdown_tracer,
};
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if is_observability_enabled() {
        init_tracing()?;
    } else {
        init_basic_console_logging();
    }

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics()? {
        let metrics_addr = server_config.metrics_addr.clone();
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(&metrics_addr).await {
                Ok(listener) => {
                    info!("Metrics available at http://{}/metrics", metrics_addr);
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "metrics server stopped");
                    }
                }
                Err(e) => error!(error = %e, addr = %metrics_addr, "failed to bind metrics listener"),
            }
        });
    }

    let state = init_app_state().await?;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&server_config.addr).await?;
    info!("Server running on http://{}", server_config.addr);
    info!("Swagger UI available at http://{}/swagger-ui", server_config.addr);
    info!("Scalar UI available at http://{}/scalar", server_config.addr);

    // Peer addresses feed the per-IP rate limiters.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
