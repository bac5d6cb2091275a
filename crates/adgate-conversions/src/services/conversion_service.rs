//! Conversion upload service
//!
//! Sends one record per call and classifies what the provider returned.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::normalize_customer_id;
use crate::errors::ConversionError;
use crate::providers::{ConversionUploadProvider, UploadClickConversionsRequest};
use crate::record::{build_record, ClickConversionRecord, ConversionEvent};

/// Provider id reported when a successful response carries no result.
pub const UNKNOWN_PROVIDER_ID: &str = "unknown";

/// Details of an accepted conversion
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Conversion action echoed back by the provider, or [`UNKNOWN_PROVIDER_ID`]
    pub provider_id: String,
    pub message: String,
    pub uploaded_at: DateTime<Utc>,
}

/// How an upload ended
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Success(UploadReceipt),
    /// The call went through but the provider rejected the record
    PartialFailure { detail: String },
    /// The call itself failed
    UpstreamError { detail: String },
}

/// Service uploading conversions through a provider
pub struct ConversionService {
    provider: Arc<dyn ConversionUploadProvider>,
    customer_id: String,
}

impl ConversionService {
    pub fn new(provider: Arc<dyn ConversionUploadProvider>, customer_id: &str) -> Self {
        Self {
            provider,
            customer_id: normalize_customer_id(customer_id),
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Wrap a single record into a provider request with partial failure on.
    pub fn build_request(&self, record: ClickConversionRecord) -> UploadClickConversionsRequest {
        UploadClickConversionsRequest {
            customer_id: self.customer_id.clone(),
            conversions: vec![record],
            partial_failure: true,
        }
    }

    /// Validate `event`, build its record and submit it.
    ///
    /// Only validation problems are returned as `Err`; the provider is not
    /// called in that case.
    pub async fn upload_click_conversion(
        &self,
        event: &ConversionEvent,
    ) -> Result<UploadOutcome, ConversionError> {
        event.validate()?;
        Ok(self.submit(build_record(event)).await)
    }

    /// Upload `record` with one provider call and classify the result.
    pub async fn submit(&self, record: ClickConversionRecord) -> UploadOutcome {
        let gclid = record.gclid.clone();
        let identifier_count = record.identity.as_ref().map_or(0, |bundle| bundle.len());

        debug!(
            "Submitting conversion for gclid {} with {} hashed identifier(s) via {}",
            gclid,
            identifier_count,
            self.provider.provider_type()
        );

        let request = self.build_request(record);

        let response = match self.provider.upload_click_conversions(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Conversion upload failed for gclid {}: {}", gclid, e);
                return UploadOutcome::UpstreamError {
                    detail: format!("Google Ads API error: {}", e),
                };
            }
        };

        if let Some(status) = response
            .partial_failure_error
            .as_ref()
            .filter(|status| status.is_failure())
        {
            let detail = format!("Partial failure: {}", status.describe());
            error!("Conversion rejected for gclid {}: {}", gclid, detail);
            return UploadOutcome::PartialFailure { detail };
        }

        let provider_id = match response
            .results
            .first()
            .and_then(|result| result.conversion_action.clone())
        {
            Some(id) => id,
            None => {
                warn!(
                    "Provider accepted conversion for gclid {} but returned no result",
                    gclid
                );
                UNKNOWN_PROVIDER_ID.to_string()
            }
        };

        info!("Conversion uploaded for gclid {} ({})", gclid, provider_id);

        UploadOutcome::Success(UploadReceipt {
            provider_id,
            message: format!("Conversion uploaded successfully for gclid: {}", gclid),
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ClickConversionResult, MockConversionProvider, ProviderFailure};
    use crate::record::test_support::sample_event;
    use rust_decimal::Decimal;

    const ACTION: &str = "customers/1234567890/conversionActions/987654321";

    fn service(provider: &MockConversionProvider) -> ConversionService {
        ConversionService::new(Arc::new(provider.clone()), "123-456-7890")
    }

    fn accepted() -> Vec<ClickConversionResult> {
        vec![ClickConversionResult {
            gclid: Some("abc123".to_string()),
            conversion_action: Some(ACTION.to_string()),
            conversion_date_time: Some("2025-11-17 15:30:00-03:00".to_string()),
        }]
    }

    #[tokio::test]
    async fn test_submit_success() {
        let provider = MockConversionProvider::new().with_results(accepted());
        let service = service(&provider);

        let outcome = service.submit(build_record(&sample_event())).await;

        match outcome {
            UploadOutcome::Success(receipt) => {
                assert_eq!(receipt.provider_id, ACTION);
                assert_eq!(
                    receipt.message,
                    "Conversion uploaded successfully for gclid: abc123"
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(provider.upload_call_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_sends_single_record_with_partial_failure() {
        let provider = MockConversionProvider::new();
        let service = service(&provider);

        service.submit(build_record(&sample_event())).await;

        let request = provider.last_request().unwrap();
        assert_eq!(request.customer_id, "1234567890");
        assert_eq!(request.conversions.len(), 1);
        assert!(request.partial_failure);
    }

    #[tokio::test]
    async fn test_submit_empty_results_yield_unknown_id() {
        let provider = MockConversionProvider::new();
        let service = service(&provider);

        let outcome = service.submit(build_record(&sample_event())).await;

        match outcome {
            UploadOutcome::Success(receipt) => assert_eq!(receipt.provider_id, UNKNOWN_PROVIDER_ID),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_result_without_action_yields_unknown_id() {
        let provider =
            MockConversionProvider::new().with_results(vec![ClickConversionResult::default()]);
        let service = service(&provider);

        let outcome = service.submit(build_record(&sample_event())).await;

        assert!(matches!(
            outcome,
            UploadOutcome::Success(UploadReceipt { ref provider_id, .. }) if provider_id == UNKNOWN_PROVIDER_ID
        ));
    }

    #[tokio::test]
    async fn test_submit_partial_failure() {
        let provider = MockConversionProvider::new()
            .with_results(vec![ClickConversionResult::default()])
            .with_partial_failure(
                "The imported gclid could not be decoded., at conversions[0].gclid",
                vec![ProviderFailure::new(
                    "UNPARSEABLE_GCLID",
                    "The imported gclid could not be decoded.",
                )],
            );
        let service = service(&provider);

        let outcome = service.submit(build_record(&sample_event())).await;

        assert_eq!(
            outcome,
            UploadOutcome::PartialFailure {
                detail: "Partial failure: The imported gclid could not be decoded., at conversions[0].gclid"
                    .to_string()
            }
        );
        assert_eq!(provider.upload_call_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_empty_partial_failure_status_is_success() {
        let mut provider = MockConversionProvider::new().with_results(accepted());
        provider.partial_failure = Some(Default::default());
        let service = service(&provider);

        let outcome = service.submit(build_record(&sample_event())).await;

        assert!(matches!(outcome, UploadOutcome::Success(_)));
    }

    #[tokio::test]
    async fn test_submit_upstream_error() {
        let provider = MockConversionProvider::new().with_api_failure(ProviderFailure::new(
            "INVALID_CONVERSION_ACTION",
            "Conversion action not found.",
        ));
        let service = service(&provider);

        let outcome = service.submit(build_record(&sample_event())).await;

        assert_eq!(
            outcome,
            UploadOutcome::UpstreamError {
                detail: "Google Ads API error: Error: INVALID_CONVERSION_ACTION - Conversion action not found."
                    .to_string()
            }
        );
        assert_eq!(provider.upload_call_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_invalid_event_skips_provider() {
        let provider = MockConversionProvider::new();
        let service = service(&provider);

        let mut event = sample_event();
        event.conversion_value = Decimal::ZERO;

        let result = service.upload_click_conversion(&event).await;

        assert!(matches!(result, Err(ConversionError::Validation(_))));
        assert_eq!(provider.upload_call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_valid_event_is_submitted() {
        let provider = MockConversionProvider::new().with_results(accepted());
        let service = service(&provider);

        let mut event = sample_event();
        event.email = Some("Customer@Example.com".to_string());

        let outcome = service.upload_click_conversion(&event).await.unwrap();

        assert!(matches!(outcome, UploadOutcome::Success(_)));
        let request = provider.last_request().unwrap();
        assert_eq!(request.conversions[0].identity.as_ref().unwrap().len(), 1);
    }
}
