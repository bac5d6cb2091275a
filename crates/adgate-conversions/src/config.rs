//! Google Ads connection settings

use serde::{Deserialize, Serialize};

use crate::errors::ConversionError;
use crate::providers::GoogleAdsCredentials;

pub const DEFAULT_API_BASE_URL: &str = "https://googleads.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v17";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleAdsConfig {
    /// Customer receiving the conversions, digits only
    pub customer_id: String,
    #[serde(skip_serializing)]
    pub developer_token: String,
    /// Manager account to act through, digits only
    pub login_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub credentials: GoogleAdsCredentials,

    pub api_base_url: String,
    pub api_version: String,
    pub token_url: String,
    pub validate_only: bool,
    pub request_timeout_secs: u64,
}

impl GoogleAdsConfig {
    /// Create a configuration with default endpoints.
    ///
    /// Customer ids are accepted in `123-456-7890` form and stored as digits.
    pub fn new(
        customer_id: &str,
        developer_token: impl Into<String>,
        credentials: GoogleAdsCredentials,
    ) -> Self {
        Self {
            customer_id: normalize_customer_id(customer_id),
            developer_token: developer_token.into(),
            login_customer_id: None,
            credentials,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            validate_only: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_login_customer_id(mut self, login_customer_id: Option<&str>) -> Self {
        self.login_customer_id = login_customer_id.map(normalize_customer_id);
        self
    }

    pub fn validate(&self) -> Result<(), ConversionError> {
        validate_customer_id("customer id", &self.customer_id)?;

        if let Some(login_customer_id) = &self.login_customer_id {
            validate_customer_id("login customer id", login_customer_id)?;
        }

        if self.developer_token.trim().is_empty() {
            return Err(ConversionError::Configuration(
                "developer token is required".to_string(),
            ));
        }

        if self.api_version.trim().is_empty() {
            return Err(ConversionError::Configuration(
                "API version is required".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConversionError::Configuration(
                "request timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for GoogleAdsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAdsConfig")
            .field("customer_id", &self.customer_id)
            .field("developer_token", &"<redacted>")
            .field("login_customer_id", &self.login_customer_id)
            .field("credentials", &self.credentials)
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("token_url", &self.token_url)
            .field("validate_only", &self.validate_only)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Strip the dashes and whitespace the Ads UI shows in customer ids.
pub fn normalize_customer_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

fn validate_customer_id(label: &str, customer_id: &str) -> Result<(), ConversionError> {
    if customer_id.len() != 10 || !customer_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConversionError::Configuration(format!(
            "{} must be 10 digits, got '{}'",
            label, customer_id
        )));
    }
    Ok(())
}
