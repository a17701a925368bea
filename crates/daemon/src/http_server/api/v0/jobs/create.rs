use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{Action, JobId, SubmitError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::form::{JobForm, FILES_FIELD, RELPATHS_FIELD};
use crate::ServiceState;

/// One file to upload, with the path it should land at inside the job
#[derive(Debug, Clone)]
pub struct SubmitFile {
    pub relative_path: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CreateJobRequest {
    pub action: Action,
    pub password: Option<String>,
    pub files: Vec<SubmitFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: JobId,
    pub files_staged: usize,
}

pub async fn handler(
    State(state): State<ServiceState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, CreateJobError> {
    let form = JobForm::read(multipart).await.map_err(|e| {
        tracing::error!("Multipart parsing error: {}", e);
        CreateJobError::Multipart(e.to_string())
    })?;
    let request = form
        .into_request()
        .map_err(|e| CreateJobError::InvalidAction(e.to_string()))?;

    let submitted = state.jobs().submit(request).await?;

    Ok((
        http::StatusCode::OK,
        axum::Json(CreateJobResponse {
            job_id: submitted.job_id,
            files_staged: submitted.files_staged,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateJobError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),
}

impl IntoResponse for CreateJobError {
    fn into_response(self) -> Response {
        match self {
            CreateJobError::InvalidAction(msg) | CreateJobError::Multipart(msg) => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", msg),
            )
                .into_response(),
            CreateJobError::Submit(SubmitError::NoFiles) => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", SubmitError::NoFiles),
            )
                .into_response(),
            CreateJobError::Submit(e @ SubmitError::ToolUnavailable(_)) => {
                tracing::warn!("{}", e);
                (
                    http::StatusCode::SERVICE_UNAVAILABLE,
                    "encrypt_decrypt binary not found".to_string(),
                )
                    .into_response()
            }
            CreateJobError::Submit(e) => {
                tracing::error!("job submission failed: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateJobRequest {
    type Response = CreateJobResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/jobs")?;

        let mut form = Form::new()
            .text("action", self.action.to_string())
            .text("password", self.password.unwrap_or_default());
        for file in self.files {
            let file_name = file
                .relative_path
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            form = form
                .part(FILES_FIELD, Part::bytes(file.contents).file_name(file_name))
                .text(RELPATHS_FIELD, file.relative_path);
        }

        Ok(client.post(full_url).multipart(form))
    }
}
