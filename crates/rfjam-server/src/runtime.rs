// SPDX-License-Identifier: Apache-2.0

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Resolves on SIGTERM or SIGINT (ctrl-c elsewhere).
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("unix signal handlers unavailable, waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Serves `app` until a shutdown signal, letting in-flight requests finish.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), String> {
    let addr = listener
        .local_addr()
        .map_err(|e| format!("listener address unavailable: {e}"))?;
    info!(addr = %addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            wait_for_shutdown_signal().await;
            info!("shutdown signal received, draining");
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
