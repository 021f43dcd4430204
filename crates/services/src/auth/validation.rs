//! Stateless checks on untrusted client input.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid redirect uri")]
    InvalidRedirectUri,

    #[error("invalid provider id")]
    InvalidProviderId,
}

/// Syntactic check only. Whether a provider with this id exists is decided by
/// the registry lookup.
pub fn validate_provider_id(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::InvalidProviderId);
    }
    Ok(())
}

/// The state must be an absolute, well-formed URI. It is later written
/// verbatim into a `Location` header, so it must also be plain visible ASCII.
pub fn validate_redirect_state(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ValidationError::InvalidRedirectUri);
    }

    // Url::parse rejects relative references (no scheme)
    Url::parse(raw).map_err(|_| ValidationError::InvalidRedirectUri)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_redirect_states() {
        for state in [
            "https://client.example/done",
            "https://my-site.com",
            "http://localhost:8080/auth/complete?next=%2Fhome&x=1",
            "myapp://oauth/callback",
            "urn:isbn:0451450523",
        ] {
            assert_eq!(validate_redirect_state(state), Ok(()), "state: {state}");
        }
    }

    #[test]
    fn test_invalid_redirect_states() {
        for state in [
            "",
            "not-a-uri",
            "/relative/path",
            "//example.com/no-scheme",
            "https://exa mple.com",
            "https://example.com/\u{e9}",
            "https://example.com/\nSet-Cookie:x=y",
            "http://[::1",
            "1http://example.com",
        ] {
            assert_eq!(
                validate_redirect_state(state),
                Err(ValidationError::InvalidRedirectUri),
                "state: {state:?}"
            );
        }
    }

    #[test]
    fn test_redirect_state_error_message() {
        let err = validate_redirect_state("not-a-uri").unwrap_err();
        assert_eq!(err.to_string(), "invalid redirect uri");
    }

    #[test]
    fn test_provider_id_pass_through() {
        assert_eq!(validate_provider_id("google"), Ok(()));
        assert_eq!(validate_provider_id("unknown-provider"), Ok(()));
        assert_eq!(
            validate_provider_id(""),
            Err(ValidationError::InvalidProviderId)
        );
    }
}
