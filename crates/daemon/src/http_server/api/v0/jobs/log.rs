use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use common::prelude::{JobError, JobId};

use crate::http_server::handlers::job_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct JobLogRequest {
    /// Job whose tool output to print
    #[arg(long)]
    pub job_id: JobId,
}

impl JobLogRequest {
    /// Route serving this job's log, relative to the daemon root
    pub fn path(&self) -> String {
        format!("/api/v0/jobs/{}/log", self.job_id)
    }
}

/// Combined stdout/stderr of the tool run, verbatim
pub async fn handler(State(state): State<ServiceState>, Path(job_id): Path<String>) -> Response {
    let Ok(id) = job_id.parse::<JobId>() else {
        return job_error_response(JobError::NotFound(job_id));
    };

    match state.jobs().log(&id).await {
        Ok(log) => (
            http::StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            log,
        )
            .into_response(),
        Err(e) => job_error_response(e),
    }
}
