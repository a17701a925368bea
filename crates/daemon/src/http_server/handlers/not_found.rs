use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

/// True when the client asked for JSON
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

pub async fn not_found_handler(headers: HeaderMap) -> Response {
    if wants_json(&headers) {
        let err_msg = serde_json::json!({"msg": "not found"});
        return (StatusCode::NOT_FOUND, Json(err_msg)).into_response();
    }
    if wants_html(&headers) {
        return (
            StatusCode::NOT_FOUND,
            Html("<h1>Not Found</h1><p><a href=\"/\">Back to upload</a></p>"),
        )
            .into_response();
    }
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "not found",
    )
        .into_response()
}
