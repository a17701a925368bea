use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use common::gate::GateError;
use common::prelude::JobError;

/// Map a failed job lookup onto a response.
///
/// Sandbox violations and bad paths are the client's fault (400), unknown
///  jobs and files are 404. Anything else is logged and kept opaque.
pub fn job_error_response(err: JobError) -> Response {
    match err {
        JobError::NotFound(_) => (StatusCode::NOT_FOUND, "job not found").into_response(),
        JobError::Gate(GateError::EmptyPath) => {
            (StatusCode::BAD_REQUEST, "missing file path").into_response()
        }
        JobError::Gate(GateError::Escapes(_)) => {
            (StatusCode::BAD_REQUEST, "invalid file path").into_response()
        }
        JobError::Gate(GateError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "file not found").into_response()
        }
        other => {
            tracing::error!("job request failed: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "unknown server error").into_response()
        }
    }
}
