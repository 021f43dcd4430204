use crate::models::{ErrorResponse, UserResponse};
use crate::routes::health::HealthResponse;
use utoipa::OpenApi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Auth Gateway API",
        description = "OAuth 2.0 sign-in gateway.\n\nClients start at `GET /api/auth/{provider_id}?redirect_uri=...` and are redirected back to `redirect_uri` once the provider callback has created or updated their user.",
        version = "1.0.0",
    ),
    paths(
        // Sign-in flow
        crate::routes::auth::initiate,
        crate::routes::auth::callback,
        // Users
        crate::routes::users::get_user,
        // Health
        crate::routes::health::health_check,
    ),
    components(schemas(ErrorResponse, UserResponse, HealthResponse)),
    tags(
        (name = "Auth", description = "OAuth sign-in flow"),
        (name = "Users", description = "User lookup"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
