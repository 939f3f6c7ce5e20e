use copyanywhere_server::host::HostState;
use copyanywhere_server::infrastructure::{audit, config::Settings, server, telemetry::TelemetryBuilder};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Telemetry reads its section of the config, so load that first.
    let config = Settings::new()?;

    TelemetryBuilder::new("copyanywhere-server", env!("CARGO_PKG_VERSION"))
        .with_settings(&config.telemetry)
        .init()?;
    let metrics = server::install_metrics()?;

    info!("CopyAnywhere server starting");
    if config.auth.password.is_none() {
        warn!("No access password configured; gated routes will refuse every request");
    }

    let state = Arc::new(HostState::new(&config).await?);
    audit::log_audit(audit::AuditEvent::SystemStartup {
        component: "Server".into(),
    });

    server::run_server(&config, state, Some(metrics), shutdown_signal()).await?;

    audit::log_audit(audit::AuditEvent::SystemShutdown {
        reason: "Signal received".into(),
    });
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
