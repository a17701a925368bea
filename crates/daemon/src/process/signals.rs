use std::time::Duration;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Delay between SIGTERM and closing the listener
const TERM_GRACE_PERIOD: Duration = Duration::from_secs(10);

pub struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownSignals {
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Resolve once the daemon should stop accepting connections.
    ///
    /// SIGINT resolves right away, SIGTERM after [`TERM_GRACE_PERIOD`].
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {
                tracing::info!("SIGINT received, shutting down");
            }
            _ = self.terminate.recv() => {
                tracing::info!(
                    grace_secs = TERM_GRACE_PERIOD.as_secs(),
                    "SIGTERM received, shutting down after grace period"
                );
                tokio::time::sleep(TERM_GRACE_PERIOD).await;
            }
        }
    }
}
