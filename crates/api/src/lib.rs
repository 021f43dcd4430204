pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;

use crate::{
    middleware::{access_log_middleware, cors_layer, handle_panic},
    openapi::ApiDoc,
    routes::{build_api_router, AppState},
};
use anyhow::Context;
use axum::{routing::get, Router};
use config::ApiConfig;
use database::{Database, InMemoryUserRepository};
use services::auth::{
    OAuthFlowService, OAuthFlowServiceTrait, ProviderRegistry, UserRepository, UserService,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
};
use utoipa::OpenApi;

/// Initialize database connection and run migrations
pub async fn init_database(db_config: &config::DatabaseConfig) -> anyhow::Result<Arc<Database>> {
    let database = Arc::new(
        Database::from_config(db_config)
            .await
            .context("Failed to connect to database")?,
    );

    tracing::info!("Starting database migrations...");
    database
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed.");

    Ok(database)
}

/// PostgreSQL when a database is configured, otherwise a process-local store.
pub async fn init_user_repository(config: &ApiConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    match &config.database {
        Some(db_config) => {
            let database = init_database(db_config).await?;
            let users: Arc<dyn UserRepository> = database.users.clone();
            Ok(users)
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory only");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

/// Wire the provider registry, user service and flow orchestrator.
pub fn init_services(
    config: &ApiConfig,
    user_repository: Arc<dyn UserRepository>,
) -> anyhow::Result<AppState> {
    let registry = ProviderRegistry::from_config(&config.auth, &config.server.public_base_url)
        .context("Failed to configure OAuth providers")?;
    if registry.is_empty() {
        tracing::warn!("No OAuth providers configured, every sign-in will return PROVIDER_NOT_FOUND");
    }

    Ok(build_app_state(Arc::new(registry), user_repository))
}

pub fn build_app_state(
    registry: Arc<ProviderRegistry>,
    user_repository: Arc<dyn UserRepository>,
) -> AppState {
    let user_service = Arc::new(UserService::new(user_repository));
    let flow_service: Arc<dyn OAuthFlowServiceTrait> =
        Arc::new(OAuthFlowService::new(registry.clone(), user_service.clone()));

    AppState {
        flow_service,
        user_service,
        registry,
    }
}

/// Build the complete application router.
///
/// Layers, outermost first: panic recovery, request id, access log, CORS.
pub fn build_app(app_state: AppState, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .nest("/api", build_api_router(app_state).merge(build_openapi_routes()))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(axum::middleware::from_fn(access_log_middleware))
                .layer(cors_layer(cors_allowed_origins)),
        )
}

/// Build OpenAPI documentation routes, mounted under `/api`
pub fn build_openapi_routes() -> Router {
    Router::new().route(
        "/docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}
