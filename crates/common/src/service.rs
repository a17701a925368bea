use std::path::PathBuf;

use crate::archive::{self, ArchiveError};
use crate::gate::{self, GateError};
use crate::job::{Action, Job, JobId};
use crate::locks::JobLocks;
use crate::manifest::Manifest;
use crate::registry::{JobRegistry, RegistryError};
use crate::stage::{self, StageError, UploadedFile};
use crate::tool::{ToolError, ToolInvoker};

/// A processing request as it arrives from a client
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub action: Action,
    pub password: Option<String>,
    pub files: Vec<UploadedFile>,
}

/// A job that made it through processing
#[derive(Debug, Clone)]
pub struct Submitted {
    pub job_id: JobId,
    pub files_staged: usize,
    pub manifest: Manifest,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("No files were uploaded.")]
    NoFiles,
    #[error("encrypt_decrypt binary not found at {0:?}")]
    ToolUnavailable(PathBuf),
    #[error("failed to stage uploads: {0}")]
    Stage(#[from] StageError),
    #[error("failed to run tool: {0}")]
    Tool(#[from] ToolError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("download rejected: {0}")]
    Gate(#[from] GateError),
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The job state machine.
///
/// created -> staged -> processed (manifest published) -> downloadable.
///  A job only becomes visible at the last step; any failure before
///  that discards the workspace. Every read takes the id as an opaque,
///  already parsed [`JobId`] and treats an unpublished job as absent.
#[derive(Debug, Clone)]
pub struct JobService<R: JobRegistry> {
    registry: R,
    tool: ToolInvoker,
    locks: JobLocks,
}

impl<R: JobRegistry> JobService<R> {
    pub fn new(registry: R, tool: ToolInvoker) -> Self {
        Self {
            registry,
            tool,
            locks: JobLocks::new(),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn tool(&self) -> &ToolInvoker {
        &self.tool
    }

    /// Run a request through the whole pipeline.
    ///
    /// The pipeline lives on its own task: once started it runs to
    ///  completion (or to discard) even if the caller stops waiting.
    pub async fn submit(&self, request: JobRequest) -> Result<Submitted, SubmitError> {
        let service = self.clone();
        tokio::spawn(async move { service.run_submission(request).await }).await?
    }

    async fn run_submission(&self, request: JobRequest) -> Result<Submitted, SubmitError> {
        if !self.tool.is_available() {
            return Err(SubmitError::ToolUnavailable(self.tool.binary().to_path_buf()));
        }

        let job = self.registry.create(request.action).await?;
        tracing::info!(job_id = %job.id(), action = %job.action(), "job created");

        match self.process(&job, request).await {
            Ok(submitted) => Ok(submitted),
            Err(e) => {
                tracing::warn!(job_id = %job.id(), "abandoning job: {}", e);
                if let Err(discard_err) = self.registry.discard(&job).await {
                    tracing::error!(job_id = %job.id(), "failed to discard job: {}", discard_err);
                }
                Err(e)
            }
        }
    }

    async fn process(&self, job: &Job, request: JobRequest) -> Result<Submitted, SubmitError> {
        let uploads_dir = job.uploads_dir();
        let files = request.files;
        let files_staged =
            tokio::task::spawn_blocking(move || stage::stage_uploads(&uploads_dir, &files))
                .await??;
        if files_staged == 0 {
            return Err(SubmitError::NoFiles);
        }
        tracing::info!(job_id = %job.id(), files_staged, "uploads staged");

        let outcome = self
            .tool
            .run(
                job.action(),
                &job.uploads_dir(),
                request.password.as_deref(),
                &job.log_path(),
            )
            .await
            .map_err(|e| match e {
                ToolError::Spawn { binary, .. } => SubmitError::ToolUnavailable(binary),
                other => SubmitError::Tool(other),
            })?;

        let _guard = self.locks.lock(job.id()).await;
        let uploads_dir = job.uploads_dir();
        let action = job.action();
        let manifest =
            tokio::task::spawn_blocking(move || Manifest::build(&uploads_dir, action))
                .await?
                .with_tool_outcome(outcome);
        self.registry.publish(job, &manifest).await?;

        tracing::info!(
            job_id = %job.id(),
            files = manifest.files.len(),
            bytes = manifest.total_size(),
            tool_success = outcome.success,
            "job processed"
        );

        Ok(Submitted {
            job_id: job.id().clone(),
            files_staged,
            manifest,
        })
    }

    /// The manifest of a published job
    pub async fn listing(&self, id: &JobId) -> Result<Manifest, JobError> {
        self.registry
            .manifest(id)
            .await?
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Combined tool output of a published job
    pub async fn log(&self, id: &JobId) -> Result<String, JobError> {
        let job = self.job(id).await?;
        match tokio::fs::read(job.log_path()).await {
            Ok(data) => Ok(String::from_utf8_lossy(&data).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a single file of a published job for download
    pub async fn download(&self, id: &JobId, requested: &str) -> Result<PathBuf, JobError> {
        let job = self.job(id).await?;
        let uploads_dir = job.uploads_dir();
        let requested = requested.to_string();
        let path =
            tokio::task::spawn_blocking(move || gate::resolve_download(&uploads_dir, &requested))
                .await??;
        Ok(path)
    }

    /// The results archive of a published job, built on first request
    pub async fn archive(&self, id: &JobId) -> Result<PathBuf, JobError> {
        let job = self.job(id).await?;

        let _guard = self.locks.lock(job.id()).await;
        let (path, built) = tokio::task::spawn_blocking(move || archive::ensure_archive(&job))
            .await??;
        if !built {
            tracing::debug!(job_id = %id, "serving cached archive");
        }
        Ok(path)
    }

    async fn job(&self, id: &JobId) -> Result<Job, JobError> {
        self.registry
            .get(id)
            .await?
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }
}
