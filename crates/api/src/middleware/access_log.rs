//! Access log middleware.
//!
//! Emits one `info` event per request with method, path, status, latency and
//! body sizes. Paths are logged without the query string, since `state` and
//! `code` travel there.

use axum::{
    body::Body,
    http::{header::CONTENT_LENGTH, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

pub async fn access_log_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let request_size = content_length(req.headers());

    let response = next.run(req).await;

    info!(
        target: "api::access",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        request_size,
        response_size = content_length(response.headers()),
        "request completed"
    );

    response
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), 0);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(content_length(&headers), 42);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("junk"));
        assert_eq!(content_length(&headers), 0);
    }
}
