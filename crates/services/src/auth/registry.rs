use super::ports::{AuthError, OAuthProvider};
use super::providers::{GoogleProvider, ProviderKind};
use config::AuthConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Provider already registered: {0}")]
    DuplicateProvider(String),

    #[error("Failed to configure provider: {0}")]
    Provider(#[from] AuthError),
}

/// Provider id to provider mapping.
///
/// Built once at startup and then shared behind an `Arc`; it exposes no
/// mutation through a shared reference, so lookups need no locking.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration, one entry per configured provider kind.
    pub fn from_config(config: &AuthConfig, public_base_url: &str) -> Result<Self, RegistryError> {
        let timeout = Duration::from_secs(config.provider_timeout_secs);
        let mut registry = Self::new();

        for kind in ProviderKind::ALL {
            match kind {
                ProviderKind::Google => {
                    if let Some(google) = &config.google {
                        let provider =
                            GoogleProvider::new(google.clone(), public_base_url, timeout)?;
                        registry.register(Arc::new(provider))?;
                    }
                }
            }
        }

        info!(providers = ?registry.ids(), "OAuth provider registry initialized");
        Ok(registry)
    }

    /// Insert a provider keyed by its id. Duplicate ids are a configuration bug.
    pub fn register(&mut self, provider: Arc<dyn OAuthProvider>) -> Result<(), RegistryError> {
        let id = provider.id().to_string();
        if self.providers.contains_key(&id) {
            return Err(RegistryError::DuplicateProvider(id));
        }
        self.providers.insert(id, provider);
        Ok(())
    }

    pub fn lookup(&self, provider_id: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.get(provider_id).cloned()
    }

    /// Registered provider ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
