use crate::api::api_router;
use crate::host::HostState;
use crate::infrastructure::config::{BindAddress, Settings};
use crate::ws::handler::ws_router;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn health_check() -> &'static str {
    "OK"
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))
}

/// Builds the full application: health and metrics endpoints, the REST API
/// and the relay.
pub fn app(state: Arc<HostState>, metrics: Option<PrometheusHandle>) -> Router {
    let mut control_plane = Router::new()
        .route("/health/live", get(health_check))
        .route("/health/ready", get(health_check));

    if let Some(handle) = metrics {
        control_plane = control_plane.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    control_plane
        .merge(api_router(state.clone()))
        .merge(ws_router(state.relay().clone()))
}

/// Serves `app` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Binds the configured address and serves the application.
///
/// # Errors
///
/// Returns an error if the address is invalid, cannot be bound, or the server
/// fails while running.
pub async fn run_server(
    config: &Settings,
    state: Arc<HostState>,
    metrics: Option<PrometheusHandle>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = BindAddress::from(&config.server).to_socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app(state, metrics), shutdown).await
}
