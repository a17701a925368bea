use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::job::Action;

/// How a tool run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// `None` if the tool was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to open log file {path:?}: {source}")]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to resolve uploads directory {path:?}: {source}")]
    UploadsDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to run {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        source: std::io::Error,
    },
    #[error("tool invoker is shutting down")]
    Closed,
}

/// Runs the external encrypt/decrypt binary.
///
/// Invocation is `<binary> <action> <uploads-dir> [password]` with the
///  working directory pinned to the project root, so the tool finds its
///  own configuration. Stdout and stderr share one handle on the job's
///  log file, which keeps the combined output verbatim and in order.
///
/// A non-zero exit is not an error here: the outcome is reported and the
///  caller decides what it means.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    binary: PathBuf,
    working_dir: PathBuf,
    permits: Arc<Semaphore>,
}

impl ToolInvoker {
    pub fn new(binary: PathBuf, working_dir: PathBuf, max_concurrent: usize) -> Self {
        Self {
            binary,
            working_dir,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn is_available(&self) -> bool {
        self.binary.is_file()
    }

    pub async fn run(
        &self,
        action: Action,
        uploads_dir: &Path,
        password: Option<&str>,
        log_path: &Path,
    ) -> Result<ToolOutcome, ToolError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ToolError::Closed)?;

        let uploads_dir =
            std::fs::canonicalize(uploads_dir).map_err(|source| ToolError::UploadsDir {
                path: uploads_dir.to_path_buf(),
                source,
            })?;

        let log_err = |source| ToolError::Log {
            path: log_path.to_path_buf(),
            source,
        };
        let stdout = File::create(log_path).map_err(log_err)?;
        let stderr = stdout.try_clone().map_err(log_err)?;

        let mut command = Command::new(&self.binary);
        command
            .arg(action.as_str())
            .arg(&uploads_dir)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        if let Some(password) = password.filter(|p| !p.trim().is_empty()) {
            command.arg(password);
        }

        tracing::info!(
            binary = %self.binary.display(),
            action = %action,
            uploads = %uploads_dir.display(),
            "running external tool"
        );

        let status = command
            .status()
            .await
            .map_err(|source| ToolError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let outcome = ToolOutcome {
            exit_code: status.code(),
            success: status.success(),
        };
        if !outcome.success {
            tracing::warn!(exit_code = ?outcome.exit_code, "external tool exited unsuccessfully");
        }

        Ok(outcome)
    }
}
