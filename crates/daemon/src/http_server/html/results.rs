use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::{Path, State};
use axum::response::Response;
use tracing::instrument;

use common::prelude::{JobError, JobId};

use crate::http_server::handlers::job_error_response;
use crate::ServiceState;

pub struct FileRow {
    pub path: String,
    pub size: String,
    pub href: String,
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub job_id: String,
    pub action: String,
    pub files: Vec<FileRow>,
    pub total_size: String,
    pub tool_failed: bool,
    pub exit_code: String,
}

#[instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>, Path(job_id): Path<String>) -> Response {
    // a malformed id can't name a job, so it's just another unknown one
    let Ok(id) = job_id.parse::<JobId>() else {
        return job_error_response(JobError::NotFound(job_id));
    };

    let manifest = match state.jobs().listing(&id).await {
        Ok(manifest) => manifest,
        Err(e) => return job_error_response(e),
    };

    let files = manifest
        .files
        .iter()
        .map(|entry| FileRow {
            path: entry.path.clone(),
            size: super::human_size(entry.size),
            href: format!("/download/{}?path={}", id, super::query_escape(&entry.path)),
        })
        .collect();

    let (tool_failed, exit_code) = match manifest.tool {
        Some(outcome) if !outcome.success => (
            true,
            outcome
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "none".to_string()),
        ),
        _ => (false, String::new()),
    };

    let template = ResultsTemplate {
        job_id: id.to_string(),
        action: manifest.action.to_string(),
        files,
        total_size: super::human_size(manifest.total_size()),
        tool_failed,
        exit_code,
    };

    template.into_response()
}
