//! Daemon lifecycle: logging, the app server and signal driven shutdown

mod logging;
mod signals;

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinError;

use crate::http_server::{self, HttpServerError};
use crate::service_state::StateSetupError;
use crate::{ServiceConfig, ServiceState};

use signals::ShutdownSignals;

/// How long in-flight requests get to finish once shutdown starts
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    State(#[from] StateSetupError),
    #[error("failed to install signal handlers: {0}")]
    Signals(std::io::Error),
    #[error(transparent)]
    Server(#[from] HttpServerError),
    #[error("app server task failed: {0}")]
    Join(#[from] JoinError),
    #[error("requests still running {}s after shutdown began", .0.as_secs())]
    DrainTimeout(Duration),
}

/// Run the daemon until SIGINT or SIGTERM.
///
/// Returns early with an error if the app server stops on its own
///  (for example when the port is taken).
pub async fn serve(config: &ServiceConfig) -> Result<(), ServeError> {
    let _log_guards = logging::init(config);

    let state = ServiceState::from_config(config).await?;
    let signals = ShutdownSignals::install().map_err(ServeError::Signals)?;

    let listen_addr = SocketAddr::from(([0, 0, 0, 0], config.app_port));
    let app_config = http_server::Config::new(listen_addr, config.max_upload_size);
    let (stop_tx, stop_rx) = watch::channel(());
    let mut server = tokio::spawn(http_server::run_app(app_config, state, stop_rx));
    tracing::info!(port = config.app_port, "sealbox daemon running");

    tokio::select! {
        finished = &mut server => return Ok(finished??),
        () = signals.recv() => {}
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(DRAIN_TIMEOUT, server).await {
        Ok(finished) => {
            finished??;
            tracing::info!("sealbox daemon stopped");
            Ok(())
        }
        Err(_) => Err(ServeError::DrainTimeout(DRAIN_TIMEOUT)),
    }
}
