pub mod google;
#[cfg(any(test, feature = "test-mocks"))]
pub mod stub;

pub use google::GoogleProvider;
#[cfg(any(test, feature = "test-mocks"))]
pub use stub::StubProvider;

/// The closed set of provider implementations compiled into the gateway.
/// Adding a provider means adding a variant here and its construction in
/// `ProviderRegistry::from_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 1] = [ProviderKind::Google];

    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
        }
    }
}

/// Callback URL the provider redirects back to after user consent.
pub fn callback_url(public_base_url: &str, provider_id: &str) -> String {
    format!(
        "{}/api/auth/{}/callback",
        public_base_url.trim_end_matches('/'),
        provider_id
    )
}
