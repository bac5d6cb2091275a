//! Conversion upload provider trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::record::ClickConversionRecord;

/// Supported conversion upload providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionProviderType {
    /// Google Ads click conversions
    GoogleAds,
}

impl std::fmt::Display for ConversionProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionProviderType::GoogleAds => write!(f, "google_ads"),
        }
    }
}

/// One error entry reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider error code, e.g. `INVALID_CONVERSION_ACTION`
    pub error_code: String,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {} - {}", self.error_code, self.message)
    }
}

/// Upload request for click conversions
#[derive(Debug, Clone)]
pub struct UploadClickConversionsRequest {
    /// Customer id, digits only
    pub customer_id: String,
    pub conversions: Vec<ClickConversionRecord>,
    /// Ask the provider to report per-record failures instead of
    /// rejecting the whole call
    pub partial_failure: bool,
}

/// Per-record failure detail returned alongside a successful call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFailureStatus {
    pub code: i32,
    pub message: String,
    pub failures: Vec<ProviderFailure>,
}

impl PartialFailureStatus {
    /// Providers may send an all-default status to mean "no failure".
    pub fn is_failure(&self) -> bool {
        self.code != 0 || !self.message.is_empty() || !self.failures.is_empty()
    }

    /// Human readable description, preferring the provider message.
    pub fn describe(&self) -> String {
        if !self.message.is_empty() {
            return self.message.clone();
        }

        self.failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Result entry for one uploaded conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickConversionResult {
    pub gclid: Option<String>,
    pub conversion_action: Option<String>,
    pub conversion_date_time: Option<String>,
}

/// Response from an upload call
#[derive(Debug, Clone, Default)]
pub struct UploadClickConversionsResponse {
    pub partial_failure_error: Option<PartialFailureStatus>,
    pub results: Vec<ClickConversionResult>,
}

/// Conversion upload provider trait for abstracting advertising APIs
#[async_trait]
pub trait ConversionUploadProvider: Send + Sync {
    /// Upload click conversions in a single call
    async fn upload_click_conversions(
        &self,
        request: &UploadClickConversionsRequest,
    ) -> Result<UploadClickConversionsResponse, ProviderError>;

    /// Get the provider type
    fn provider_type(&self) -> ConversionProviderType;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_display() {
        assert_eq!(ConversionProviderType::GoogleAds.to_string(), "google_ads");
    }

    #[test]
    fn test_provider_failure_display() {
        let failure = ProviderFailure::new("EXPIRED_EVENT", "The click is too old.");
        assert_eq!(failure.to_string(), "Error: EXPIRED_EVENT - The click is too old.");
    }

    #[test]
    fn test_default_partial_failure_is_not_a_failure() {
        assert!(!PartialFailureStatus::default().is_failure());

        let status = PartialFailureStatus {
            code: 3,
            ..Default::default()
        };
        assert!(status.is_failure());
    }

    #[test]
    fn test_partial_failure_describe_falls_back_to_failures() {
        let status = PartialFailureStatus {
            code: 3,
            message: String::new(),
            failures: vec![ProviderFailure::new("UNPARSEABLE_GCLID", "Bad gclid.")],
        };

        assert_eq!(status.describe(), "Error: UNPARSEABLE_GCLID - Bad gclid.");
    }
}
