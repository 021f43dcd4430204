use super::ports::{AuthError, OAuthIdentity, UserId, UserRecord, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Maps provider identities onto persisted users, keyed by email.
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Create or refresh the user owning `identity.email`.
    ///
    /// A new user gets a fresh id and creation time; an existing one keeps
    /// both and only takes the latest names and provider. The repository
    /// performs this as one atomic write.
    pub async fn upsert_identity(&self, identity: OAuthIdentity) -> Result<UserRecord, AuthError> {
        let identity = normalize_identity(identity)?;
        let now = Utc::now();

        let candidate = UserRecord {
            user_id: UserId::new(),
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
            identity_provider: identity.provider,
            created_at: now,
            updated_at: now,
        };
        let candidate_id = candidate.user_id;

        debug!("Upserting user: {}", candidate.email);
        let user = self
            .user_repository
            .upsert(candidate)
            .await
            .map_err(|e| AuthError::InternalError(format!("Failed to upsert user: {e}")))?;

        if user.user_id == candidate_id {
            info!("Created new user {} ({})", user.email, user.user_id);
        } else {
            debug!("Updated existing user {} ({})", user.email, user.user_id);
        }
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: UserId) -> Result<UserRecord, AuthError> {
        self.user_repository
            .get_by_id(user_id)
            .await
            .map_err(|e| AuthError::InternalError(format!("Failed to get user: {e}")))?
            .ok_or(AuthError::UserNotFound)
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        self.user_repository
            .get_by_email(&normalize_email(email))
            .await
            .map_err(|e| AuthError::InternalError(format!("Failed to get user by email: {e}")))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn normalize_identity(identity: OAuthIdentity) -> Result<OAuthIdentity, AuthError> {
    let email = normalize_email(&identity.email);
    if email.is_empty() {
        return Err(AuthError::AuthFailed(format!(
            "{} identity has no email",
            identity.provider
        )));
    }

    Ok(OAuthIdentity {
        provider: identity.provider,
        email,
        first_name: identity.first_name.trim().to_string(),
        last_name: identity.last_name.trim().to_string(),
    })
}
