use std::fmt::Debug;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use http::request::Parts;

use common::prelude::ToolInvoker;

use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Check that everything a job needs is in place before accepting uploads.
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("jobs directory is missing")]
    MissingJobsDir,

    #[error("encrypt_decrypt binary is missing")]
    ToolUnavailable,
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

pub struct StateDataSource(DynDataSource);

impl Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDataSource").finish()
    }
}

impl StateDataSource {
    #[cfg(test)]
    pub fn new(dds: DynDataSource) -> Self {
        Self(dds)
    }
}

impl Deref for StateDataSource {
    type Target = DynDataSource;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

struct JobsSource {
    jobs_dir: PathBuf,
    tool: ToolInvoker,
}

#[async_trait]
impl DataSource for JobsSource {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        match tokio::fs::metadata(&self.jobs_dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(DataSourceError::MissingJobsDir),
        }
        if !self.tool.is_available() {
            return Err(DataSourceError::ToolUnavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StateDataSource
where
    ServiceState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ();

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ServiceState::from_ref(state);
        Ok(StateDataSource(Arc::new(JobsSource {
            jobs_dir: state.jobs_dir().to_path_buf(),
            tool: state.jobs().tool().clone(),
        })))
    }
}
