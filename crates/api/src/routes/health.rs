use crate::routes::api::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_OK: &str = "ok";
pub const STATUS_NO_PROVIDERS: &str = "no_providers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok`, or `no_providers` when sign-in cannot succeed for any provider
    pub status: String,
    pub version: String,
    /// Provider ids accepted by `/api/auth/{provider_id}`, sorted
    pub providers: Vec<String>,
}

/// Liveness and provider inventory
///
/// Always answers 200 while the process serves requests; an empty registry is
/// reported through `status` rather than the HTTP code.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Gateway is serving", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let providers = app_state.registry.ids();
    let status = if providers.is_empty() {
        STATUS_NO_PROVIDERS
    } else {
        STATUS_OK
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers,
    })
}
