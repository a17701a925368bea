use std::path::PathBuf;

use clap::Args;

use sealbox_daemon::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Checkout the encrypt_decrypt tool runs in (default: current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// The encrypt_decrypt binary (default: <project root>/encrypt_decrypt)
    #[arg(long)]
    pub tool_path: Option<PathBuf>,

    /// App server port (default: 5057)
    #[arg(long)]
    pub app_port: Option<u16>,

    /// Where job workspaces are kept (default: <config dir>/jobs)
    #[arg(long)]
    pub jobs_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] sealbox_daemon::state::StateError),

    #[error("could not determine current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let project_root = match &self.project_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };

        let mut config = AppConfig::for_project(project_root);
        if let Some(tool_path) = &self.tool_path {
            config.tool_path = tool_path.clone();
        }
        if let Some(app_port) = self.app_port {
            config.app_port = app_port;
        }
        config.jobs_dir = self.jobs_dir.clone();

        let state = AppState::init(ctx.config_path.clone(), config)?;

        let tool_status = if state.config.tool_path.is_file() {
            "found"
        } else {
            "not found yet, build it with `make`"
        };

        let output = format!(
            "Initialized sealbox directory at: {}\n\
             - Config: {}\n\
             - Jobs: {}\n\
             - Project root: {}\n\
             - Tool: {} ({})\n\
             - App port: {}",
            state.state_dir.display(),
            state.config_path.display(),
            state.jobs_dir.display(),
            state.config.project_root.display(),
            state.config.tool_path.display(),
            tool_status,
            state.config.app_port,
        );

        Ok(output)
    }
}
