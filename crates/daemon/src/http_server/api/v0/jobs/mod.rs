use axum::routing::{get, post};
use axum::Router;

pub mod create;
pub mod get;
pub mod log;

pub use create::{CreateJobRequest, CreateJobResponse, SubmitFile};
pub use get::{GetJobRequest, GetJobResponse};
pub use log::JobLogRequest;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/:job_id", get(get::handler))
        .route("/:job_id/log", get(log::handler))
        .with_state(state)
}
