//! Configurable provider for tests. Every outcome can be set per instance.

use crate::auth::ports::{AuthError, OAuthIdentity, OAuthProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct StubProvider {
    id: String,
    redirect_uri: Result<String, String>,
    token: Result<String, String>,
    identity: Result<OAuthIdentity, String>,
    panic_on_exchange: bool,
    exchange_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            redirect_uri: Ok(format!("https://{id}.example/authorize")),
            token: Ok("stub-identity-token".to_string()),
            identity: Ok(OAuthIdentity {
                provider: id.to_string(),
                email: "jane@example.com".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            }),
            panic_on_exchange: false,
            exchange_calls: AtomicUsize::new(0),
            resolve_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_redirect_uri(mut self, uri: &str) -> Self {
        self.redirect_uri = Ok(uri.to_string());
        self
    }

    pub fn with_redirect_error(mut self, message: &str) -> Self {
        self.redirect_uri = Err(message.to_string());
        self
    }

    pub fn with_exchange_error(mut self, message: &str) -> Self {
        self.token = Err(message.to_string());
        self
    }

    pub fn with_identity(mut self, identity: OAuthIdentity) -> Self {
        self.identity = Ok(identity);
        self
    }

    pub fn with_identity_error(mut self, message: &str) -> Self {
        self.identity = Err(message.to_string());
        self
    }

    pub fn panicking_on_exchange(mut self) -> Self {
        self.panic_on_exchange = true;
        self
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for StubProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn redirect_uri(&self, _state: &str) -> Result<String, AuthError> {
        self.redirect_uri.clone().map_err(AuthError::ConfigError)
    }

    async fn exchange_code(&self, _code: &str) -> Result<String, AuthError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_exchange {
            panic!("stub provider panicked during code exchange");
        }
        self.token.clone().map_err(AuthError::OAuthError)
    }

    async fn resolve_identity(&self, _identity_token: &str) -> Result<OAuthIdentity, AuthError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.identity.clone().map_err(AuthError::AuthFailed)
    }
}
