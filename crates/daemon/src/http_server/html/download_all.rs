use axum::extract::{Path, State};
use axum::response::Response;

use common::prelude::{JobError, JobId};

use crate::http_server::handlers::job_error_response;
use crate::ServiceState;

const DOWNLOAD_NAME: &str = "processed.zip";

/// Every processed file of a job, zipped, minus sidecars
pub async fn handler(State(state): State<ServiceState>, Path(job_id): Path<String>) -> Response {
    let Ok(id) = job_id.parse::<JobId>() else {
        return job_error_response(JobError::NotFound(job_id));
    };

    let path = match state.jobs().archive(&id).await {
        Ok(path) => path,
        Err(e) => return job_error_response(e),
    };

    match tokio::fs::read(&path).await {
        Ok(data) => super::attachment(DOWNLOAD_NAME, "application/zip", data),
        Err(e) => job_error_response(JobError::Io(e)),
    }
}
