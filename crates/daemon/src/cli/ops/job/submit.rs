use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use common::prelude::Action;
use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::v0::jobs::{CreateJobRequest, CreateJobResponse, SubmitFile};

#[derive(Args, Debug, Clone)]
pub struct Submit {
    /// encrypt or decrypt
    #[arg(long, default_value = "encrypt")]
    pub action: Action,

    /// Password handed to the tool (omit to use its configured key)
    #[arg(long)]
    pub password: Option<String>,

    /// Files and directories to upload; directories keep their structure
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitOpError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to read {0:?}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to walk {0:?}: {1}")]
    Walk(PathBuf, walkdir::Error),
    #[error("{0:?} has no usable file name")]
    Unnamed(PathBuf),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Submit {
    type Error = SubmitOpError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let paths = self.paths.clone();
        let files = tokio::task::spawn_blocking(move || collect_files(&paths)).await??;

        let request = CreateJobRequest {
            action: self.action,
            password: self.password.clone(),
            files,
        };

        let mut client = ctx.client()?;
        let response: CreateJobResponse = client.call(request).await?;

        Ok(format!(
            "Job {} processed {} file(s)\nresults: {}results/{}",
            response.job_id,
            response.files_staged,
            ctx.remote,
            response.job_id
        ))
    }
}

/// Read every file under `paths`.
///
/// A plain file is sent under its own name. A directory is walked and each
///  file is sent as `<dir name>/<path inside dir>`, the way browsers label
///  folder uploads.
fn collect_files(paths: &[PathBuf]) -> Result<Vec<SubmitFile>, SubmitOpError> {
    let mut files = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SubmitOpError::Unnamed(path.clone()))?;

        if !path.is_dir() {
            files.push(read_file(path, name.to_string())?);
            continue;
        }

        for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| SubmitOpError::Walk(path.clone(), e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let inner = entry
                .path()
                .strip_prefix(path)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(read_file(entry.path(), format!("{}/{}", name, inner))?);
        }
    }
    Ok(files)
}

fn read_file(path: &Path, relative_path: String) -> Result<SubmitFile, SubmitOpError> {
    let contents = std::fs::read(path).map_err(|e| SubmitOpError::Read(path.to_path_buf(), e))?;
    Ok(SubmitFile {
        relative_path,
        contents,
    })
}
