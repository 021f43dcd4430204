use crate::models::{CallbackQuery, ErrorResponse, InitiateQuery};
use crate::routes::api::AppState;
use crate::routes::common::{found, ApiError};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Response,
};
use services::auth::{CallbackParams, FlowError};
use tracing::debug;

/// Start sign-in with a provider
///
/// Validates `redirect_uri` and redirects the browser to the provider's consent page.
/// The provider later returns the same value as `state` to the callback.
#[utoipa::path(
    get,
    path = "/api/auth/{provider_id}",
    params(
        ("provider_id" = String, Path, description = "Provider id, e.g. `google`"),
        InitiateQuery
    ),
    responses(
        (status = 302, description = "Redirect to the provider authorization URL"),
        (status = 400, description = "Invalid redirect_uri", body = ErrorResponse),
        (status = 404, description = "Unknown provider", body = ErrorResponse),
        (status = 500, description = "Provider misconfigured", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn initiate(
    State(app_state): State<AppState>,
    Path(provider_id): Path<String>,
    query: Result<Query<InitiateQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    debug!("Initiating OAuth flow for provider {}", provider_id);

    app_state.flow_service.check_provider(&provider_id)?;
    let Query(query) = query.map_err(bad_query)?;

    let outcome = app_state
        .flow_service
        .initiate(&provider_id, &query.redirect_uri)
        .await?;

    found(&outcome.redirect_to)
}

/// Provider callback
///
/// Exchanges the authorization code, creates or updates the user, and redirects
/// the browser back to the URI carried in `state`.
#[utoipa::path(
    get,
    path = "/api/auth/{provider_id}/callback",
    params(
        ("provider_id" = String, Path, description = "Provider id, e.g. `google`"),
        CallbackQuery
    ),
    responses(
        (status = 302, description = "Redirect back to the client's redirect_uri"),
        (status = 400, description = "Invalid state, missing code or consent denied", body = ErrorResponse),
        (status = 404, description = "Unknown provider", body = ErrorResponse),
        (status = 500, description = "Provider or persistence failure", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Path(provider_id): Path<String>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    debug!("Received OAuth callback for provider {}", provider_id);

    app_state.flow_service.check_provider(&provider_id)?;
    let Query(query) = query.map_err(bad_query)?;

    let params = CallbackParams {
        code: query.code,
        state: query.state,
        error: query.error,
    };
    let outcome = app_state.flow_service.callback(&provider_id, params).await?;

    found(&outcome.redirect_to)
}

/// Malformed query strings (e.g. a repeated `state`) are client errors.
/// Only checked after the provider lookup, so an unknown provider still wins.
fn bad_query(rejection: QueryRejection) -> FlowError {
    FlowError::BadRequest(rejection.body_text())
}
