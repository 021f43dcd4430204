use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

// Domain ID types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        UserId(uuid)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity data returned by a provider's user-info endpoint. Untrusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthIdentity {
    /// Id of the provider that vouched for this identity
    pub provider: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// The gateway's canonical, persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Provider used for the most recent login
    pub identity_provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A third-party identity provider driving the authorization-code flow.
///
/// Implementations are stateless apart from static configuration resolved at
/// construction time, so a single instance is shared by every request.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Stable identifier used as the routing key, e.g. `"google"`.
    fn id(&self) -> &str;

    /// Build the provider's authorization URL embedding `state` and this
    /// gateway's callback URL. Only fails on missing static configuration.
    async fn redirect_uri(&self, state: &str) -> Result<String, AuthError>;

    /// Exchange a single-use authorization code for an identity token.
    async fn exchange_code(&self, code: &str) -> Result<String, AuthError>;

    /// Resolve an identity token into profile fields.
    async fn resolve_identity(&self, identity_token: &str) -> Result<OAuthIdentity, AuthError>;
}

// Repository traits
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> anyhow::Result<Option<UserRecord>>;

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Insert `candidate` if no user has its email, otherwise overwrite the
    /// name fields and identity provider of the existing user. Must be atomic
    /// with respect to the email: the stored `user_id` and `created_at` of an
    /// existing user are never replaced. Returns the stored record.
    async fn upsert(&self, candidate: UserRecord) -> anyhow::Result<UserRecord>;
}
