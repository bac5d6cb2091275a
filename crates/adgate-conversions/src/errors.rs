//! Error types for the conversion gateway

use thiserror::Error;

use crate::providers::ProviderFailure;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors raised by a conversion upload provider.
///
/// Every variant is reported to callers as an upstream error; the gateway
/// does not separate retryable causes from fatal ones.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{}", summarize_api_error(.status, .message, .failures))]
    Api {
        status: u16,
        message: String,
        failures: Vec<ProviderFailure>,
    },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

/// Per-failure entries win over the top-level message when the provider
/// sent any.
fn summarize_api_error(status: &u16, message: &str, failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return format!("HTTP {}: {}", status, message);
    }

    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_joins_failures() {
        let err = ProviderError::Api {
            status: 400,
            message: "Request contains an invalid argument.".to_string(),
            failures: vec![
                ProviderFailure::new("INVALID_CONVERSION_ACTION", "Conversion action not found."),
                ProviderFailure::new("UNPARSEABLE_GCLID", "The gclid could not be decoded."),
            ],
        };

        assert_eq!(
            err.to_string(),
            "Error: INVALID_CONVERSION_ACTION - Conversion action not found. \
             | Error: UNPARSEABLE_GCLID - The gclid could not be decoded."
        );
    }

    #[test]
    fn test_api_error_without_failures_uses_message() {
        let err = ProviderError::Api {
            status: 503,
            message: "The service is currently unavailable.".to_string(),
            failures: Vec::new(),
        };

        assert_eq!(
            err.to_string(),
            "HTTP 503: The service is currently unavailable."
        );
    }

    #[test]
    fn test_provider_error_is_transparent_in_conversion_error() {
        let err: ConversionError = ProviderError::Authentication("token expired".to_string()).into();
        assert_eq!(err.to_string(), "Authentication failed: token expired");
    }
}
