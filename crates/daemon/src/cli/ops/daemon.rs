use clap::Args;

use sealbox_daemon::state::AppState;
use sealbox_daemon::{serve, ServeError, ServiceConfig};

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override app server port (default from config)
    #[arg(long)]
    pub app_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] sealbox_daemon::state::StateError),
    #[error("daemon failed: {0}")]
    Serve(#[from] ServeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;

        let config = ServiceConfig {
            app_port: self.app_port.unwrap_or(state.config.app_port),
            max_upload_size: state.config.max_upload_size_mb.saturating_mul(BYTES_PER_MB),
            jobs_dir: state.jobs_dir.clone(),
            tool_path: state.config.tool_path.clone(),
            project_root: state.config.project_root.clone(),
            max_concurrent_jobs: state.config.max_concurrent_jobs.max(1),
            log_level: state.config.log_level()?,
            log_dir: self.log_dir.clone(),
        };

        serve(&config).await?;
        Ok("daemon stopped".to_string())
    }
}
