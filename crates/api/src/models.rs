use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use services::auth::UserRecord;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Error body shared by every route: a stable `code` and a human-readable `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `BAD_REQUEST`
    pub code: String,
    pub reason: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InitiateQuery {
    /// Absolute URI the client is sent back to once sign-in completes
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorization code issued by the provider
    pub code: Option<String>,
    /// The `redirect_uri` given at initiation, relayed by the provider
    #[serde(default)]
    pub state: String,
    /// Provider error, e.g. `access_denied` when the user declined consent
    pub error: Option<String>,
}

/// A persisted user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Provider of the most recent sign-in
    pub identity_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.user_id.0,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            identity_provider: user.identity_provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
