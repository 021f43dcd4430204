use serde::Deserialize;
use std::{collections::HashMap, env};

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// When absent, users are kept in an in-memory store
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            database: DatabaseConfig::from_env_optional()?,
        })
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_database_port")]
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Enable TLS for database connections, verified against the system trust store
    #[serde(default)]
    pub tls_enabled: bool,
}

fn default_database_port() -> u16 {
    5432
}

fn default_max_connections() -> usize {
    5
}

impl DatabaseConfig {
    /// Create a connection URL for this database configuration
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Load from environment variables. Returns `None` when `DATABASE_HOST` is not set.
    pub fn from_env_optional() -> Result<Option<Self>, String> {
        if env::var("DATABASE_HOST").is_err() {
            return Ok(None);
        }
        Self::from_env().map(Some)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("DATABASE_HOST").map_err(|_| "DATABASE_HOST not set")?,
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .map_err(|_| "DATABASE_PORT must be a valid port number")?,
            database: env::var("DATABASE_NAME").map_err(|_| "DATABASE_NAME not set")?,
            username: env::var("DATABASE_USERNAME").map_err(|_| "DATABASE_USERNAME not set")?,
            password: env::var("DATABASE_PASSWORD").map_err(|_| "DATABASE_PASSWORD not set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| "DATABASE_MAX_CONNECTIONS must be a valid number")?,
            tls_enabled: env::var("DATABASE_TLS_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| "DATABASE_TLS_ENABLED must be true or false")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally reachable base URL of this gateway, used to build provider callback URLs
    pub public_base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| "SERVER_PORT must be a valid port number")?;

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
            port,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging Configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Ok(level) = env::var("LOG_MODULE_API") {
            modules.insert("api".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_DATABASE") {
            modules.insert("database".to_string(), level);
        }

        Ok(Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            modules,
        })
    }

    /// Build an `EnvFilter` directive string from the level and module overrides
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.clone();
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        for (module, level) in modules {
            filter.push_str(&format!(",{module}={level}"));
        }
        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub google: Option<GoogleOAuthConfig>,
    /// Upper bound for any single call to an identity provider
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_provider_timeout_secs() -> u64 {
    10
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            google: None,
            provider_timeout_secs: default_provider_timeout_secs(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let google = if let (Ok(client_id), Ok(client_secret)) = (
            env::var("GOOGLE_CLIENT_ID"),
            env::var("GOOGLE_CLIENT_SECRET"),
        ) {
            Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                scopes: env::var("GOOGLE_SCOPES")
                    .ok()
                    .map(|s| split_list(&s))
                    .unwrap_or_else(default_google_scopes),
                auth_url: env::var("GOOGLE_AUTH_URL")
                    .unwrap_or_else(|_| DEFAULT_GOOGLE_AUTH_URL.to_string()),
                token_url: env::var("GOOGLE_TOKEN_URL")
                    .unwrap_or_else(|_| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
                userinfo_url: env::var("GOOGLE_USERINFO_URL")
                    .unwrap_or_else(|_| DEFAULT_GOOGLE_USERINFO_URL.to_string()),
            })
        } else {
            None
        };

        Ok(Self {
            google,
            provider_timeout_secs: env::var("AUTH_PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| default_provider_timeout_secs().to_string())
                .parse()
                .map_err(|_| "AUTH_PROVIDER_TIMEOUT_SECS must be a valid number")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| split_list(&s))
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_google_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_google_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
    #[serde(default = "default_google_userinfo_url")]
    pub userinfo_url: String,
}

fn default_google_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "email".to_string(),
        "profile".to_string(),
    ]
}

fn default_google_auth_url() -> String {
    DEFAULT_GOOGLE_AUTH_URL.to_string()
}

fn default_google_token_url() -> String {
    DEFAULT_GOOGLE_TOKEN_URL.to_string()
}

fn default_google_userinfo_url() -> String {
    DEFAULT_GOOGLE_USERINFO_URL.to_string()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', ' '])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
