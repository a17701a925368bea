use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{Action, JobError, JobId, ManifestEntry, ToolOutcome};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::handlers::job_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct GetJobRequest {
    /// Job to show
    #[arg(long)]
    pub job_id: JobId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobResponse {
    pub job_id: JobId,
    pub action: Action,
    pub files: Vec<ManifestEntry>,
    #[serde(default)]
    pub tool: Option<ToolOutcome>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, GetJobError> {
    let id: JobId = job_id
        .parse()
        .map_err(|_| GetJobError::Job(JobError::NotFound(job_id)))?;
    let manifest = state.jobs().listing(&id).await?;

    Ok((
        http::StatusCode::OK,
        axum::Json(GetJobResponse {
            job_id: id,
            action: manifest.action,
            files: manifest.files,
            tool: manifest.tool,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("Job error: {0}")]
    Job(#[from] JobError),
}

impl IntoResponse for GetJobError {
    fn into_response(self) -> Response {
        match self {
            GetJobError::Job(e) => job_error_response(e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for GetJobRequest {
    type Response = GetJobResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/api/v0/jobs/{}", self.job_id))?;
        Ok(client.get(full_url))
    }
}
