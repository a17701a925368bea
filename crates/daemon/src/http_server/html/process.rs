use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};

use common::prelude::SubmitError;

use crate::http_server::form::JobForm;
use crate::ServiceState;

const INVALID_ACTION_MSG: &str = "Invalid action.";
const TOOL_MISSING_MSG: &str = "encrypt_decrypt binary not found. Build the project with `make`.";

/// Form submission from the upload page.
///
/// Problems the user can fix come back to the upload page as a
///  message; a processed job redirects to its results.
pub async fn handler(
    State(state): State<ServiceState>,
    multipart: Multipart,
) -> Result<Redirect, ProcessError> {
    let form = JobForm::read(multipart).await.map_err(|e| {
        tracing::error!("Multipart parsing error: {}", e);
        ProcessError::Multipart(e.to_string())
    })?;

    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => {
            tracing::info!("rejecting submission: {}", e);
            return Ok(back_to_index(INVALID_ACTION_MSG));
        }
    };

    match state.jobs().submit(request).await {
        Ok(submitted) => Ok(Redirect::to(&format!("/results/{}", submitted.job_id))),
        Err(SubmitError::NoFiles) => Ok(back_to_index(&SubmitError::NoFiles.to_string())),
        Err(SubmitError::ToolUnavailable(path)) => {
            tracing::warn!(tool = %path.display(), "tool binary missing");
            Ok(back_to_index(TOOL_MISSING_MSG))
        }
        Err(e) => Err(ProcessError::Submit(e)),
    }
}

fn back_to_index(message: &str) -> Redirect {
    Redirect::to(&format!("/?error={}", super::query_escape(message)))
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        match self {
            ProcessError::Multipart(msg) => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", msg),
            )
                .into_response(),
            ProcessError::Submit(e) => {
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
