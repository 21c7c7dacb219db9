//! API key handling.
//!
//! The client reads its key exactly once, when it is built, from a
//! [`CredentialProvider`]. After that the key never changes.

use crate::{Error, Result};
use std::fmt;

/// Environment variable read by [`EnvCredentials::default`].
pub const API_KEY_ENV: &str = "RADAR_API_KEY";

/// A Radar API key. Never empty.
///
/// `Debug` output is redacted so the key does not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if the key is empty or blank.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::ConfigurationError(
                "API key must be provided".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Supplies the API key at client construction.
pub trait CredentialProvider {
    fn api_key(&self) -> Result<ApiKey>;
}

impl CredentialProvider for ApiKey {
    fn api_key(&self) -> Result<ApiKey> {
        Ok(self.clone())
    }
}

impl CredentialProvider for str {
    fn api_key(&self) -> Result<ApiKey> {
        ApiKey::new(self)
    }
}

impl CredentialProvider for String {
    fn api_key(&self) -> Result<ApiKey> {
        ApiKey::new(self.as_str())
    }
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<ApiKey> {
        let key = std::env::var(&self.var).map_err(|e| {
            Error::ConfigurationError(format!("Failed to read {}: {}", self.var, e))
        })?;
        ApiKey::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        assert!(matches!(
            ApiKey::new(""),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            ApiKey::new("   "),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("prj_test_sk_secret").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.expose(), "prj_test_sk_secret");
    }

    #[test]
    fn test_string_providers() {
        assert_eq!("abc".api_key().unwrap().expose(), "abc");
        assert_eq!(String::from("abc").api_key().unwrap().expose(), "abc");
    }

    #[test]
    fn test_env_provider_missing_variable() {
        let provider = EnvCredentials::new("RADAR_MAPPING_API_TEST_UNSET_VARIABLE");
        assert!(matches!(
            provider.api_key(),
            Err(Error::ConfigurationError(_))
        ));
    }
}
