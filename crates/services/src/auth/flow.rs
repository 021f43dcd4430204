//! Two-phase authorization-code flow: initiation and callback.
//!
//! No server-side state links the two phases. The client's return URI
//! travels as the OAuth `state` through the provider and is re-validated on
//! the way back.

use super::ports::{AuthError, OAuthProvider, UserRecord};
use super::registry::ProviderRegistry;
use super::user_service::UserService;
use super::validation::{validate_provider_id, validate_redirect_state, ValidationError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const CODE_BAD_REQUEST: &str = "BAD_REQUEST";
pub const CODE_PROVIDER_NOT_FOUND: &str = "PROVIDER_NOT_FOUND";
pub const CODE_INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

/// Closed taxonomy of flow failures. None of them is retried by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("{0}")]
    BadRequest(String),

    #[error("provider not found")]
    ProviderNotFound,

    #[error("{0}")]
    InternalServerError(String),
}

impl FlowError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::BadRequest(_) => CODE_BAD_REQUEST,
            FlowError::ProviderNotFound => CODE_PROVIDER_NOT_FOUND,
            FlowError::InternalServerError(_) => CODE_INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<ValidationError> for FlowError {
    fn from(err: ValidationError) -> Self {
        FlowError::BadRequest(err.to_string())
    }
}

impl From<AuthError> for FlowError {
    fn from(err: AuthError) -> Self {
        FlowError::InternalServerError(err.to_string())
    }
}

/// Where the client should be sent after a successful initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateOutcome {
    pub redirect_to: String,
}

/// Where the client should be sent after a successful callback, and the user it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub redirect_to: String,
    pub user: UserRecord,
}

/// Raw callback parameters as received from the provider redirect.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: String,
    /// Set by the provider instead of `code` when the user declined consent
    pub error: Option<String>,
}

#[async_trait]
pub trait OAuthFlowServiceTrait: Send + Sync {
    /// Fails with `ProviderNotFound` unless `provider_id` is registered.
    fn check_provider(&self, provider_id: &str) -> Result<(), FlowError>;

    /// Validate the client's return URI and send the client to the provider.
    async fn initiate(&self, provider_id: &str, state: &str) -> Result<InitiateOutcome, FlowError>;

    /// Complete the flow: exchange the code, resolve and persist the user,
    /// then send the client back to the URI it started with.
    async fn callback(
        &self,
        provider_id: &str,
        params: CallbackParams,
    ) -> Result<CallbackOutcome, FlowError>;
}

pub struct OAuthFlowService {
    registry: Arc<ProviderRegistry>,
    user_service: Arc<UserService>,
}

impl OAuthFlowService {
    pub fn new(registry: Arc<ProviderRegistry>, user_service: Arc<UserService>) -> Self {
        Self {
            registry,
            user_service,
        }
    }

    /// An unknown provider id is reported before any other input is examined.
    fn provider(&self, provider_id: &str) -> Result<Arc<dyn OAuthProvider>, FlowError> {
        validate_provider_id(provider_id)
            .ok()
            .and_then(|_| self.registry.lookup(provider_id))
            .ok_or_else(|| {
                warn!("Unknown OAuth provider: {:?}", provider_id);
                FlowError::ProviderNotFound
            })
    }
}

#[async_trait]
impl OAuthFlowServiceTrait for OAuthFlowService {
    fn check_provider(&self, provider_id: &str) -> Result<(), FlowError> {
        self.provider(provider_id).map(|_| ())
    }

    async fn initiate(&self, provider_id: &str, state: &str) -> Result<InitiateOutcome, FlowError> {
        debug!("Initiating {} OAuth flow", provider_id);

        let provider = self.provider(provider_id)?;

        if let Err(e) = validate_redirect_state(state) {
            warn!("Rejected redirect uri for {}: {}", provider_id, e);
            return Err(e.into());
        }

        let redirect_to = provider.redirect_uri(state).await.map_err(|e| {
            error!("Failed to generate {} auth URL: {}", provider_id, e);
            FlowError::from(e)
        })?;

        debug!("Redirecting to {} for authorization", provider_id);
        Ok(InitiateOutcome { redirect_to })
    }

    async fn callback(
        &self,
        provider_id: &str,
        params: CallbackParams,
    ) -> Result<CallbackOutcome, FlowError> {
        debug!("{} OAuth callback received", provider_id);

        let provider = self.provider(provider_id)?;

        // The provider only relays the state, so it is checked again here
        if let Err(e) = validate_redirect_state(&params.state) {
            warn!("Rejected callback state for {}: {}", provider_id, e);
            return Err(e.into());
        }

        if let Some(provider_error) = params.error.filter(|e| !e.is_empty()) {
            warn!("{} returned an authorization error: {}", provider_id, provider_error);
            return Err(FlowError::BadRequest(format!(
                "provider returned error: {provider_error}"
            )));
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FlowError::BadRequest("missing authorization code".to_string()))?;

        // Authorization codes are single-use; a failed exchange is final
        let identity_token = provider.exchange_code(&code).await.map_err(|e| {
            error!("{} code exchange failed: {}", provider_id, e);
            FlowError::from(e)
        })?;

        let identity = provider
            .resolve_identity(&identity_token)
            .await
            .map_err(|e| {
                error!("{} identity resolution failed: {}", provider_id, e);
                FlowError::from(e)
            })?;

        let user = self
            .user_service
            .upsert_identity(identity)
            .await
            .map_err(|e| {
                error!("Failed to persist {} user: {}", provider_id, e);
                FlowError::from(e)
            })?;

        info!("{} user authenticated: {}", provider_id, user.email);
        Ok(CallbackOutcome {
            redirect_to: params.state,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ports::{MockUserRepository, OAuthIdentity, UserRepository};
    use crate::auth::providers::StubProvider;

    const STATE: &str = "https://client.example/done";

    fn service_with(
        providers: Vec<Arc<StubProvider>>,
        repo: impl UserRepository + 'static,
    ) -> OAuthFlowService {
        let mut registry = ProviderRegistry::new();
        for provider in providers {
            registry.register(provider).unwrap();
        }
        OAuthFlowService::new(
            Arc::new(registry),
            Arc::new(UserService::new(Arc::new(repo))),
        )
    }

    fn untouched_repo() -> MockUserRepository {
        let mut repo = MockUserRepository::new();
        repo.expect_upsert().never();
        repo
    }

    fn params(code: &str, state: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            state: state.to_string(),
            error: None,
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FlowError::BadRequest("x".into()).code(), "BAD_REQUEST");
        assert_eq!(FlowError::ProviderNotFound.code(), "PROVIDER_NOT_FOUND");
        assert_eq!(
            FlowError::InternalServerError("x".into()).code(),
            "INTERNAL_SERVER_ERROR"
        );
        assert_eq!(
            FlowError::from(ValidationError::InvalidRedirectUri).reason(),
            "invalid redirect uri"
        );
    }

    #[tokio::test]
    async fn test_initiate_success() {
        let provider = StubProvider::new("google").with_redirect_uri("https://provider.example/auth");
        let service = service_with(vec![Arc::new(provider)], untouched_repo());

        let outcome = service.initiate("google", STATE).await.unwrap();
        assert_eq!(outcome.redirect_to, "https://provider.example/auth");
    }

    #[tokio::test]
    async fn test_initiate_invalid_state() {
        let service = service_with(vec![Arc::new(StubProvider::new("google"))], untouched_repo());

        let err = service.initiate("google", "not-a-uri").await.unwrap_err();
        assert_eq!(err, FlowError::BadRequest("invalid redirect uri".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_provider_wins_over_invalid_input() {
        let service = service_with(vec![Arc::new(StubProvider::new("google"))], untouched_repo());

        let err = service.initiate("unknown", "not-a-uri").await.unwrap_err();
        assert_eq!(err, FlowError::ProviderNotFound);

        let err = service
            .callback("unknown", CallbackParams::default())
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::ProviderNotFound);
    }

    #[test]
    fn test_check_provider() {
        let service = service_with(vec![Arc::new(StubProvider::new("google"))], untouched_repo());

        assert_eq!(service.check_provider("google"), Ok(()));
        assert_eq!(service.check_provider("github"), Err(FlowError::ProviderNotFound));
        assert_eq!(service.check_provider(""), Err(FlowError::ProviderNotFound));
    }

    #[tokio::test]
    async fn test_initiate_unknown_provider() {
        let service = service_with(
            vec![Arc::new(StubProvider::new("google"))],
            untouched_repo(),
        );

        for provider_id in ["googlesomething", "github", ""] {
            let err = service.initiate(provider_id, STATE).await.unwrap_err();
            assert_eq!(err, FlowError::ProviderNotFound);
        }
    }

    #[tokio::test]
    async fn test_initiate_provider_error() {
        let provider = StubProvider::new("google").with_redirect_error("client id missing");
        let service = service_with(vec![Arc::new(provider)], untouched_repo());

        let err = service.initiate("google", STATE).await.unwrap_err();
        assert_eq!(
            err,
            FlowError::InternalServerError("Configuration error: client id missing".to_string())
        );
    }

    #[tokio::test]
    async fn test_callback_success_redirects_to_state() {
        let state = "https://client.example/done?next=%2Fhome%3Fa%3D1&b=%20";
        let mut repo = MockUserRepository::new();
        repo.expect_upsert()
            .withf(|candidate| candidate.email == "jane@example.com")
            .times(1)
            .returning(|candidate| Ok(candidate));
        let service = service_with(vec![Arc::new(StubProvider::new("google"))], repo);

        let outcome = service
            .callback("google", params("auth-code", state))
            .await
            .unwrap();

        assert_eq!(outcome.redirect_to, state);
        assert_eq!(outcome.user.email, "jane@example.com");
        assert_eq!(outcome.user.identity_provider, "google");
    }

    #[tokio::test]
    async fn test_callback_exchange_failure_writes_nothing() {
        let provider = Arc::new(StubProvider::new("google").with_exchange_error("some error occurred"));
        let service = service_with(vec![provider.clone()], untouched_repo());

        let err = service
            .callback("google", params("auth-code", STATE))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FlowError::InternalServerError("OAuth error: some error occurred".to_string())
        );
        assert_eq!(provider.exchange_calls(), 1);
        assert_eq!(provider.resolve_calls(), 0);
    }

    #[tokio::test]
    async fn test_callback_identity_failure_writes_nothing() {
        let provider = StubProvider::new("google").with_identity_error("token rejected");
        let service = service_with(vec![Arc::new(provider)], untouched_repo());

        let err = service
            .callback("google", params("auth-code", STATE))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(err.reason(), "Authentication failed: token rejected");
    }

    #[tokio::test]
    async fn test_callback_persistence_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_upsert()
            .returning(|_| Err(anyhow::anyhow!("database unavailable")));
        let service = service_with(vec![Arc::new(StubProvider::new("google"))], repo);

        let err = service
            .callback("google", params("auth-code", STATE))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
    }

    #[tokio::test]
    async fn test_callback_revalidates_state() {
        let provider = Arc::new(StubProvider::new("google"));
        let service = service_with(vec![provider.clone()], untouched_repo());

        let err = service
            .callback("google", params("auth-code", "/relative"))
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::BadRequest("invalid redirect uri".to_string()));
        assert_eq!(provider.exchange_calls(), 0);
    }

    #[tokio::test]
    async fn test_callback_unknown_provider() {
        let service = service_with(vec![Arc::new(StubProvider::new("google"))], untouched_repo());

        let err = service
            .callback("unknown", params("auth-code", STATE))
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::ProviderNotFound);
    }

    #[tokio::test]
    async fn test_callback_missing_code_or_provider_error() {
        let provider = Arc::new(StubProvider::new("google"));
        let service = service_with(vec![provider.clone()], untouched_repo());

        let err = service
            .callback(
                "google",
                CallbackParams {
                    code: None,
                    state: STATE.to_string(),
                    error: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, FlowError::BadRequest("missing authorization code".to_string()));

        let err = service
            .callback(
                "google",
                CallbackParams {
                    code: None,
                    state: STATE.to_string(),
                    error: Some("access_denied".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FlowError::BadRequest("provider returned error: access_denied".to_string())
        );
        assert_eq!(provider.exchange_calls(), 0);
    }

    #[tokio::test]
    async fn test_callback_passes_resolved_identity_to_store() {
        let provider = StubProvider::new("google").with_identity(OAuthIdentity {
            provider: "google".to_string(),
            email: "Bob@Example.com".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Smith".to_string(),
        });
        let mut repo = MockUserRepository::new();
        repo.expect_upsert()
            .withf(|candidate| {
                candidate.email == "bob@example.com"
                    && candidate.first_name == "Bob"
                    && candidate.last_name == "Smith"
            })
            .times(1)
            .returning(|candidate| Ok(candidate));
        let service = service_with(vec![Arc::new(provider)], repo);

        let outcome = service
            .callback("google", params("auth-code", STATE))
            .await
            .unwrap();
        assert_eq!(outcome.user.email, "bob@example.com");
    }
}
