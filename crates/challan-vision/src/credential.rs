//! API credential handling.
//!
//! The key value is never logged or formatted. Errors and debug output
//! describe existence and shape only.

use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Errors from credential validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The environment variable is unset or empty.
    #[error("{var} environment variable is not set")]
    Missing { var: String },

    /// The value exists but does not carry the provider's key prefix.
    #[error("{var} does not look like a valid API key (expected prefix {required_prefix:?})")]
    Malformed {
        var: String,
        required_prefix: String,
    },
}

/// A validated API key.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Validate a raw value against the provider's required key prefix.
    pub fn validate(
        value: Option<String>,
        var: &str,
        required_prefix: &str,
    ) -> Result<Self, CredentialError> {
        let value = match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                return Err(CredentialError::Missing {
                    var: var.to_string(),
                });
            }
        };

        if !value.starts_with(required_prefix) {
            return Err(CredentialError::Malformed {
                var: var.to_string(),
                required_prefix: required_prefix.to_string(),
            });
        }

        debug!(var, length = value.len(), "credential accepted");
        Ok(Self(value))
    }

    /// Read and validate the key from the environment.
    pub fn from_env(var: &str, required_prefix: &str) -> Result<Self, CredentialError> {
        Self::validate(std::env::var(var).ok(), var, required_prefix)
    }

    /// The raw key, for request construction only.
    pub(crate) fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(<redacted>)")
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_value_rejected() {
        let err = ApiCredential::validate(None, "GEMINI_API_KEY", "AI").unwrap_err();
        assert_eq!(
            err,
            CredentialError::Missing {
                var: "GEMINI_API_KEY".to_string()
            }
        );
    }

    #[test]
    fn test_blank_value_rejected_as_missing() {
        let err =
            ApiCredential::validate(Some("   ".to_string()), "GEMINI_API_KEY", "AI").unwrap_err();
        assert!(matches!(err, CredentialError::Missing { .. }));
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let err = ApiCredential::validate(Some("sk-123456".to_string()), "GEMINI_API_KEY", "AI")
            .unwrap_err();
        assert_eq!(
            err,
            CredentialError::Malformed {
                var: "GEMINI_API_KEY".to_string(),
                required_prefix: "AI".to_string()
            }
        );
    }

    #[test]
    fn test_valid_key_accepted() {
        let cred =
            ApiCredential::validate(Some("AIzaSyTest123".to_string()), "GEMINI_API_KEY", "AI")
                .unwrap();
        assert_eq!(cred.reveal(), "AIzaSyTest123");
    }

    #[test]
    fn test_debug_and_display_redact_the_key() {
        let cred =
            ApiCredential::validate(Some("AIzaSySecret".to_string()), "GEMINI_API_KEY", "AI")
                .unwrap();
        assert!(!format!("{cred:?}").contains("Secret"));
        assert!(!format!("{cred}").contains("Secret"));
    }
}
