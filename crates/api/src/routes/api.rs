use axum::{routing::get, Router};
use services::auth::{OAuthFlowServiceTrait, ProviderRegistry, UserService};
use std::sync::Arc;

use crate::routes::{
    auth::{callback, initiate},
    health::health_check,
    users::get_user,
};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub flow_service: Arc<dyn OAuthFlowServiceTrait>,
    pub user_service: Arc<UserService>,
    pub registry: Arc<ProviderRegistry>,
}

/// Build the `/api` router: sign-in flow, user lookup and health.
pub fn build_api_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/{provider_id}", get(initiate))
        .route("/{provider_id}/callback", get(callback));

    Router::new()
        .nest("/auth", auth_routes)
        .route("/user/{user_id}", get(get_user))
        .route("/health", get(health_check))
        .with_state(app_state)
}
