use std::path::{Path, PathBuf};

use common::prelude::{FsJobRegistry, JobService, ToolInvoker};

use crate::ServiceConfig;

/// Shared handles for request handlers
#[derive(Debug, Clone)]
pub struct State {
    jobs: JobService<FsJobRegistry>,
    jobs_dir: PathBuf,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        tokio::fs::create_dir_all(&config.jobs_dir)
            .await
            .map_err(|e| StateSetupError::JobsDir(config.jobs_dir.clone(), e))?;

        let tool = ToolInvoker::new(
            config.tool_path.clone(),
            config.project_root.clone(),
            config.max_concurrent_jobs,
        );
        if !tool.is_available() {
            // not fatal: submissions are refused until the binary shows up
            tracing::warn!(tool = %config.tool_path.display(), "encrypt_decrypt binary not found");
        }

        tracing::info!(
            jobs_dir = %config.jobs_dir.display(),
            tool = %config.tool_path.display(),
            max_concurrent_jobs = config.max_concurrent_jobs,
            "job service ready"
        );

        Ok(Self::new(
            JobService::new(FsJobRegistry::new(config.jobs_dir.clone()), tool),
            config.jobs_dir.clone(),
        ))
    }

    pub fn new(jobs: JobService<FsJobRegistry>, jobs_dir: PathBuf) -> Self {
        Self { jobs, jobs_dir }
    }

    pub fn jobs(&self) -> &JobService<FsJobRegistry> {
        &self.jobs
    }

    pub fn jobs_dir(&self) -> &Path {
        &self.jobs_dir
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to create jobs directory {0:?}: {1}")]
    JobsDir(PathBuf, std::io::Error),
}
