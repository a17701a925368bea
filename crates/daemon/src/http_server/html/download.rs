use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use common::prelude::{JobError, JobId};

use crate::http_server::handlers::job_error_response;
use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub path: Option<String>,
}

/// A single processed file, as an attachment
pub async fn handler(
    State(state): State<ServiceState>,
    Path(job_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let requested = match query.path {
        Some(path) if !path.is_empty() => path,
        _ => return (StatusCode::BAD_REQUEST, "missing file path").into_response(),
    };
    let Ok(id) = job_id.parse::<JobId>() else {
        return job_error_response(JobError::NotFound(job_id));
    };

    let path = match state.jobs().download(&id, &requested).await {
        Ok(path) => path,
        Err(e) => {
            tracing::info!(job_id = %id, requested, "download refused: {}", e);
            return job_error_response(e);
        }
    };

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) => return job_error_response(JobError::Io(e)),
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    let mime_type = mime_guess::from_path(&path).first_or_octet_stream();

    super::attachment(file_name, mime_type.as_ref(), data)
}
