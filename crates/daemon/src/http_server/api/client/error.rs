use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to the daemon failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("bad daemon URL: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("daemon cannot run jobs right now: {0}")]
    Unavailable(String),
    #[error("daemon answered {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl ApiError {
    /// Classify a non-success response
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let body = body.trim().to_string();
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::SERVICE_UNAVAILABLE => Self::Unavailable(body),
            _ => Self::HttpStatus(status, body),
        }
    }
}
