pub mod access_log;

pub use access_log::access_log_middleware;

use crate::models::ErrorResponse;
use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use services::auth::flow::CODE_INTERNAL_SERVER_ERROR;
use std::any::Any;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tracing::{error, warn};

/// Turns a handler panic into the regular internal error body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            CODE_INTERNAL_SERVER_ERROR,
            "internal server error",
        )),
    )
        .into_response()
}

/// CORS for the configured origins, or any origin when none are configured.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(AnyOrigin);

    if allowed_origins.is_empty() {
        return layer.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
