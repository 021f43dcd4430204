use crate::models::{ErrorResponse, UserResponse};
use crate::routes::api::AppState;
use crate::routes::common::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use services::auth::{flow::CODE_BAD_REQUEST, UserId};
use uuid::Uuid;

/// Get a user by ID
///
/// Also answers `HEAD`, with the same status and no body.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = Uuid::parse_str(&user_id)
        .map(UserId)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, CODE_BAD_REQUEST, "invalid user id"))?;

    let user = app_state.user_service.get_user(user_id).await?;
    Ok(Json(user.into()))
}
