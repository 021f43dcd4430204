#![allow(dead_code)]

use api::{build_app, build_app_state};
use axum_test::TestServer;
use config::ApiConfig;
use database::InMemoryUserRepository;
use services::auth::{providers::StubProvider, ProviderRegistry};
use std::sync::Arc;

pub const CLIENT_REDIRECT: &str = "https://client.example/done";

/// Helper function to create a test configuration
pub fn test_config() -> ApiConfig {
    ApiConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use port 0 to get a random available port
            public_base_url: "https://auth.example.com".to_string(),
        },
        logging: config::LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
            modules: std::collections::HashMap::new(),
        },
        auth: config::AuthConfig {
            google: None,
            provider_timeout_secs: 5,
            cors_allowed_origins: vec![],
        },
        database: None,
    }
}

/// A running app backed by stub providers and an in-memory user store.
pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<InMemoryUserRepository>,
}

pub fn setup_app(providers: Vec<Arc<StubProvider>>) -> TestApp {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry
            .register(provider)
            .expect("Failed to register provider");
    }

    let users = Arc::new(InMemoryUserRepository::new());
    let app_state = build_app_state(Arc::new(registry), users.clone());
    let app = build_app(app_state, &test_config().auth.cors_allowed_origins);

    TestApp {
        server: TestServer::new(app).expect("Failed to create test server"),
        users,
    }
}

pub fn setup_app_with_stub(provider: StubProvider) -> (TestApp, Arc<StubProvider>) {
    let provider = Arc::new(provider);
    (setup_app(vec![provider.clone()]), provider)
}
