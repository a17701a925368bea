use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::Query;
use axum::Extension;
use serde::Deserialize;
use tracing::instrument;

use crate::http_server::Config;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub error: Option<String>,
    pub max_upload: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub error: Option<String>,
}

#[instrument(skip(config))]
pub async fn handler(
    Extension(config): Extension<Config>,
    Query(query): Query<IndexQuery>,
) -> askama_axum::Response {
    let template = IndexTemplate {
        error: query.error.filter(|e| !e.is_empty()),
        max_upload: super::human_size(config.max_upload_size as u64),
    };

    template.into_response()
}
