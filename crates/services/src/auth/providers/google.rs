use super::{callback_url, ProviderKind};
use crate::auth::ports::{AuthError, OAuthIdentity, OAuthProvider};
use async_trait::async_trait;
use config::GoogleOAuthConfig;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    RedirectUrl, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

// Type alias for a fully configured OAuth client
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

/// Google sign-in over the OAuth 2.0 authorization-code flow
pub struct GoogleProvider {
    client: ConfiguredClient,
    client_id: String,
    scopes: Vec<String>,
    userinfo_url: String,
    http_client: Client,
}

impl GoogleProvider {
    pub fn new(
        config: GoogleOAuthConfig,
        public_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let auth_url = AuthUrl::new(config.auth_url)
            .map_err(|e| AuthError::ConfigError(format!("Invalid Google auth URL: {e}")))?;

        let token_url = TokenUrl::new(config.token_url)
            .map_err(|e| AuthError::ConfigError(format!("Invalid Google token URL: {e}")))?;

        let redirect_url = RedirectUrl::new(callback_url(public_base_url, ProviderKind::Google.id()))
            .map_err(|e| AuthError::ConfigError(format!("Invalid redirect URL: {e}")))?;

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        // Redirects are never followed on token or user-info calls
        let http_client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id: config.client_id,
            scopes: config.scopes,
            userinfo_url: config.userinfo_url,
            http_client,
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn id(&self) -> &str {
        ProviderKind::Google.id()
    }

    async fn redirect_uri(&self, state: &str) -> Result<String, AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::ConfigError(
                "Google client id not configured".to_string(),
            ));
        }

        let state = state.to_string();
        let (auth_url, _) = self
            .client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("include_granted_scopes", "true")
            .url();

        Ok(auth_url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        debug!("Exchanging Google code for token");

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| match e {
                RequestTokenError::Request(err) => {
                    AuthError::NetworkError(format!("Token request failed: {err}"))
                }
                other => AuthError::OAuthError(format!("Token exchange failed: {other}")),
            })?;

        Ok(token.access_token().secret().to_string())
    }

    async fn resolve_identity(&self, identity_token: &str) -> Result<OAuthIdentity, AuthError> {
        debug!("Fetching Google user info with identity token");

        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(identity_token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Failed to fetch Google user: {e}")))?;

        let status = response.status();
        debug!("Google API response status: {}", status);

        if !status.is_success() {
            return Err(AuthError::AuthFailed(format!(
                "Google API returned status: {status}"
            )));
        }

        let user: GoogleUser = response
            .json()
            .await
            .map_err(|e| AuthError::AuthFailed(format!("Failed to parse Google user: {e}")))?;

        user.into_identity()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    #[serde(default)]
    email: Option<String>,
    #[serde(default, alias = "verified_email")]
    email_verified: Option<bool>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl GoogleUser {
    fn into_identity(self) -> Result<OAuthIdentity, AuthError> {
        let email = self
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AuthError::AuthFailed("Google user has no email".to_string()))?;

        if self.email_verified == Some(false) {
            return Err(AuthError::AuthFailed(format!(
                "Google email {email} is not verified"
            )));
        }

        // Fall back to splitting the display name when structured names are absent
        let (first_name, last_name) = match (self.given_name, self.family_name) {
            (None, None) => {
                let name = self.name.unwrap_or_default();
                match name.trim().split_once(' ') {
                    Some((first, last)) => (first.to_string(), last.trim().to_string()),
                    None => (name.trim().to_string(), String::new()),
                }
            }
            (first, last) => (first.unwrap_or_default(), last.unwrap_or_default()),
        };

        Ok(OAuthIdentity {
            provider: ProviderKind::Google.id().to_string(),
            email,
            first_name,
            last_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use url::Url;

    fn test_config(server: &MockServer) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            scopes: vec!["openid".to_string(), "email".to_string()],
            auth_url: server.url("/o/oauth2/v2/auth"),
            token_url: server.url("/token"),
            userinfo_url: server.url("/userinfo"),
        }
    }

    fn provider(server: &MockServer) -> GoogleProvider {
        GoogleProvider::new(
            test_config(server),
            "https://auth.example.com",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_redirect_uri_embeds_state_and_callback() {
        let server = MockServer::start_async().await;
        let provider = provider(&server);
        let state = "https://client.example/done?next=%2Fhome";

        let uri = provider.redirect_uri(state).await.unwrap();
        let url = Url::parse(&uri).unwrap();

        assert!(uri.starts_with(&server.url("/o/oauth2/v2/auth")));
        assert_eq!(query_value(&url, "state").as_deref(), Some(state));
        assert_eq!(
            query_value(&url, "redirect_uri").as_deref(),
            Some("https://auth.example.com/api/auth/google/callback")
        );
        assert_eq!(
            query_value(&url, "client_id").as_deref(),
            Some("test-client-id")
        );
        assert_eq!(query_value(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(query_value(&url, "scope").as_deref(), Some("openid email"));
        assert_eq!(
            query_value(&url, "include_granted_scopes").as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_redirect_uri_fails_without_client_id() {
        let server = MockServer::start_async().await;
        let mut config = test_config(&server);
        config.client_id = String::new();
        let provider =
            GoogleProvider::new(config, "https://auth.example.com", Duration::from_secs(5))
                .unwrap();

        let err = provider
            .redirect_uri("https://client.example/done")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .body_contains("code=auth-code");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "access_token": "access-123",
                        "token_type": "Bearer",
                        "expires_in": 3600
                    }));
            })
            .await;

        let token = provider(&server).exchange_code("auth-code").await.unwrap();

        token_mock.assert_async().await;
        assert_eq!(token, "access-123");
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400)
                    .header("content-type", "application/json")
                    .json_body(json!({ "error": "invalid_grant" }));
            })
            .await;

        let err = provider(&server)
            .exchange_code("used-code")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::OAuthError(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_resolve_identity_success() {
        let server = MockServer::start_async().await;
        let userinfo_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/userinfo")
                    .header("authorization", "Bearer access-123");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "sub": "1234567890",
                        "email": "jane@example.com",
                        "email_verified": true,
                        "given_name": "Jane",
                        "family_name": "Doe"
                    }));
            })
            .await;

        let identity = provider(&server)
            .resolve_identity("access-123")
            .await
            .unwrap();

        userinfo_mock.assert_async().await;
        assert_eq!(
            identity,
            OAuthIdentity {
                provider: "google".to_string(),
                email: "jane@example.com".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_identity_rejected_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/userinfo");
                then.status(401);
            })
            .await;

        let err = provider(&server)
            .resolve_identity("expired")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AuthFailed(_)));
    }

    #[test]
    fn test_identity_requires_email() {
        let user = GoogleUser {
            email: None,
            email_verified: None,
            given_name: Some("Jane".to_string()),
            family_name: None,
            name: None,
        };
        assert!(matches!(user.into_identity(), Err(AuthError::AuthFailed(_))));
    }

    #[test]
    fn test_identity_rejects_unverified_email() {
        let user = GoogleUser {
            email: Some("jane@example.com".to_string()),
            email_verified: Some(false),
            given_name: None,
            family_name: None,
            name: None,
        };
        assert!(matches!(user.into_identity(), Err(AuthError::AuthFailed(_))));
    }

    #[test]
    fn test_identity_splits_display_name() {
        let user = GoogleUser {
            email: Some("jane@example.com".to_string()),
            email_verified: None,
            given_name: None,
            family_name: None,
            name: Some("Jane van Doe".to_string()),
        };
        let identity = user.into_identity().unwrap();
        assert_eq!(identity.first_name, "Jane");
        assert_eq!(identity.last_name, "van Doe");
    }
}
