//! Google Ads click conversion upload over the REST interface
//!
//! Calls `customers/{customer_id}:uploadClickConversions`. Authentication
//! needs a developer token plus an OAuth access token; see
//! [`GoogleAdsCredentials`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::credentials::TokenSource;
use super::traits::{
    ClickConversionResult, ConversionProviderType, ConversionUploadProvider,
    PartialFailureStatus, ProviderFailure, UploadClickConversionsRequest,
    UploadClickConversionsResponse,
};
use crate::config::GoogleAdsConfig;
use crate::errors::{ConversionError, ProviderError};
use crate::identity::IdentifierKind;
use crate::record::ClickConversionRecord;

/// Google Ads conversion upload provider
pub struct GoogleAdsProvider {
    client: Client,
    base_url: String,
    api_version: String,
    developer_token: String,
    login_customer_id: Option<String>,
    /// Ask Google Ads to validate uploads without recording them
    validate_only: bool,
    tokens: TokenSource,
}

impl GoogleAdsProvider {
    /// Create a new Google Ads provider from validated settings
    pub fn new(config: &GoogleAdsConfig) -> Result<Self, ConversionError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ConversionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let tokens = TokenSource::new(
            client.clone(),
            config.token_url.clone(),
            config.credentials.clone(),
        );

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            developer_token: config.developer_token.clone(),
            login_customer_id: config.login_customer_id.clone(),
            validate_only: config.validate_only,
            tokens,
        })
    }

    fn upload_url(&self, customer_id: &str) -> String {
        format!(
            "{}/{}/customers/{}:uploadClickConversions",
            self.base_url, self.api_version, customer_id
        )
    }
}

// Google Ads REST request types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadClickConversionsBody<'a> {
    conversions: Vec<GoogleClickConversion<'a>>,
    partial_failure: bool,
    validate_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleClickConversion<'a> {
    gclid: &'a str,
    conversion_action: &'a str,
    conversion_date_time: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    conversion_value: Decimal,
    currency_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    user_identifiers: Vec<GoogleUserIdentifier<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GoogleUserIdentifier<'a> {
    HashedEmail(&'a str),
    HashedPhoneNumber(&'a str),
    AddressInfo(GoogleAddressInfo<'a>),
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAddressInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    hashed_first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashed_last_name: Option<&'a str>,
}

impl<'a> From<&'a ClickConversionRecord> for GoogleClickConversion<'a> {
    fn from(record: &'a ClickConversionRecord) -> Self {
        let mut user_identifiers = Vec::new();
        let mut address = GoogleAddressInfo::default();

        for identifier in record.identity.iter().flat_map(|b| b.identifiers()) {
            let value = identifier.value.as_str();
            match identifier.kind {
                IdentifierKind::Email => {
                    user_identifiers.push(GoogleUserIdentifier::HashedEmail(value))
                }
                IdentifierKind::Phone => {
                    user_identifiers.push(GoogleUserIdentifier::HashedPhoneNumber(value))
                }
                IdentifierKind::FirstName => address.hashed_first_name = Some(value),
                IdentifierKind::LastName => address.hashed_last_name = Some(value),
            }
        }

        // Names travel together as one address identifier
        if address.hashed_first_name.is_some() || address.hashed_last_name.is_some() {
            user_identifiers.push(GoogleUserIdentifier::AddressInfo(address));
        }

        Self {
            gclid: &record.gclid,
            conversion_action: &record.conversion_action,
            conversion_date_time: &record.conversion_date_time,
            conversion_value: record.conversion_value,
            currency_code: &record.currency_code,
            order_id: record.order_id.as_deref(),
            user_identifiers,
        }
    }
}

// Google Ads REST response types
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleUploadResponse {
    #[serde(default)]
    partial_failure_error: Option<GoogleStatus>,
    #[serde(default)]
    results: Vec<GoogleClickConversionResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleClickConversionResult {
    gclid: Option<String>,
    conversion_action: Option<String>,
    conversion_date_time: Option<String>,
}

/// `google.rpc.Status`, used both for partial failures and error bodies
#[derive(Debug, Default, Deserialize)]
struct GoogleStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<GoogleFailureDetail>,
}

/// A `GoogleAdsFailure` detail; other detail types decode with no errors.
#[derive(Debug, Default, Deserialize)]
struct GoogleFailureDetail {
    #[serde(default)]
    errors: Vec<GoogleAdsError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAdsError {
    /// One-entry map such as `{"conversionUploadError": "EXPIRED_EVENT"}`
    #[serde(default)]
    error_code: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleStatus,
}

impl GoogleStatus {
    fn failures(&self) -> Vec<ProviderFailure> {
        self.details
            .iter()
            .flat_map(|detail| detail.errors.iter())
            .map(|error| ProviderFailure::new(error.code_name(), error.message.clone()))
            .collect()
    }
}

impl GoogleAdsError {
    fn code_name(&self) -> String {
        match self.error_code.values().next() {
            Some(serde_json::Value::String(code)) => code.clone(),
            Some(other) => other.to_string(),
            None => "UNKNOWN".to_string(),
        }
    }
}

impl From<GoogleUploadResponse> for UploadClickConversionsResponse {
    fn from(response: GoogleUploadResponse) -> Self {
        let partial_failure_error = response.partial_failure_error.map(|status| {
            PartialFailureStatus {
                code: status.code,
                failures: status.failures(),
                message: status.message,
            }
        });

        let results = response
            .results
            .into_iter()
            .map(|result| ClickConversionResult {
                gclid: result.gclid,
                conversion_action: result.conversion_action,
                conversion_date_time: result.conversion_date_time,
            })
            .collect();

        Self {
            partial_failure_error,
            results,
        }
    }
}

fn api_error(status: StatusCode, body: &str) -> ProviderError {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) => ProviderError::Api {
            status: status.as_u16(),
            failures: envelope.error.failures(),
            message: envelope.error.message,
        },
        Err(_) => ProviderError::Api {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            },
            failures: Vec::new(),
        },
    }
}

#[async_trait]
impl ConversionUploadProvider for GoogleAdsProvider {
    async fn upload_click_conversions(
        &self,
        request: &UploadClickConversionsRequest,
    ) -> Result<UploadClickConversionsResponse, ProviderError> {
        debug!(
            "Uploading {} click conversion(s) to Google Ads for customer {}",
            request.conversions.len(),
            request.customer_id
        );

        let body = UploadClickConversionsBody {
            conversions: request.conversions.iter().map(Into::into).collect(),
            partial_failure: request.partial_failure,
            validate_only: self.validate_only,
        };

        let access_token = self.tokens.access_token().await?;

        let mut http_request = self
            .client
            .post(self.upload_url(&request.customer_id))
            .header("Authorization", format!("Bearer {}", access_token))
            .header("developer-token", &self.developer_token)
            .json(&body);

        if let Some(login_customer_id) = &self.login_customer_id {
            http_request = http_request.header("login-customer-id", login_customer_id);
        }

        let response = http_request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            return Err(api_error(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(UploadClickConversionsResponse::default());
        }

        let parsed: GoogleUploadResponse = serde_json::from_str(&text).map_err(|e| {
            ProviderError::Decode(format!("{} - Body: {}", e, text))
        })?;

        Ok(parsed.into())
    }

    fn provider_type(&self) -> ConversionProviderType {
        ConversionProviderType::GoogleAds
    }
}
