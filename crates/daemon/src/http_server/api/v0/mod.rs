use axum::Router;

pub mod jobs;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/jobs", jobs::router(state.clone()))
        .with_state(state)
}
