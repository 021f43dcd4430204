use crate::models::ErrorResponse;
use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use services::auth::{flow::CODE_INTERNAL_SERVER_ERROR, AuthError, FlowError};

pub const CODE_USER_NOT_FOUND: &str = "USER_NOT_FOUND";

/// Error returned by every handler, rendered as `ErrorResponse` JSON.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {}", body.reason)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, reason: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, reason),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_INTERNAL_SERVER_ERROR,
            reason,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Map flow errors to HTTP status codes
impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        let status = match err {
            FlowError::BadRequest(_) => StatusCode::BAD_REQUEST,
            FlowError::ProviderNotFound => StatusCode::NOT_FOUND,
            FlowError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.code(), err.reason())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound => {
                Self::new(StatusCode::NOT_FOUND, CODE_USER_NOT_FOUND, "user not found")
            }
            other => Self::internal(other.to_string()),
        }
    }
}

/// `302 Found` pointing at `location`.
///
/// `axum::response::Redirect` only offers 303/307/308, so the response is built by hand.
pub fn found(location: &str) -> Result<Response, ApiError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| ApiError::internal("redirect location is not a valid header value"))?;
    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_error_status_mapping() {
        let cases = [
            (
                FlowError::BadRequest("invalid redirect uri".to_string()),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                FlowError::ProviderNotFound,
                StatusCode::NOT_FOUND,
                "PROVIDER_NOT_FOUND",
            ),
            (
                FlowError::InternalServerError("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.body.code, code);
        }
    }

    #[test]
    fn test_user_not_found_mapping() {
        let err = ApiError::from(AuthError::UserNotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.body, ErrorResponse::new("USER_NOT_FOUND", "user not found"));
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("https://client.example/done").unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://client.example/done"
        );
    }

    #[test]
    fn test_found_rejects_invalid_header() {
        let err = found("https://client.example/\nsplit").unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
