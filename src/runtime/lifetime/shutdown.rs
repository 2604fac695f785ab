use std::time::Duration;

use actix_web::dev::ServerHandle;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Waits for Ctrl+C / SIGTERM, then stops the server gracefully so in-flight
/// requests (and their single-statement writes) complete.
pub async fn listen_for_shutdown(handle: ServerHandle) {
    wait_for_signal().await;
    info!("Shutdown signal received, draining in-flight requests...");

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), handle.stop(true)).await {
        Ok(()) => info!("Server stopped"),
        Err(_) => {
            error!(
                "Graceful shutdown timed out after {} seconds, forcing stop",
                SHUTDOWN_TIMEOUT_SECS
            );
            handle.stop(false).await;
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal as unix_signal};

    let mut term = match unix_signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {}", e);
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        res = signal::ctrl_c() => {
            if let Err(e) = res {
                warn!("Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.", e);
            }
        }
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        );
    }
}
