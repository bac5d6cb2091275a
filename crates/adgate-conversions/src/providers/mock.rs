//! Mock conversion provider for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{
    ClickConversionResult, ConversionProviderType, ConversionUploadProvider,
    PartialFailureStatus, ProviderFailure, UploadClickConversionsRequest,
    UploadClickConversionsResponse,
};

/// Mock conversion provider for testing
#[derive(Debug, Clone)]
pub struct MockConversionProvider {
    /// Counter for tracking calls
    pub upload_count: Arc<AtomicUsize>,
    pub last_request: Arc<Mutex<Option<UploadClickConversionsRequest>>>,

    /// Configurable responses
    pub results: Vec<ClickConversionResult>,
    pub partial_failure: Option<PartialFailureStatus>,
    pub failure: Option<ProviderFailure>,
}

impl Default for MockConversionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConversionProvider {
    /// A provider that accepts every conversion and returns no results
    pub fn new() -> Self {
        Self {
            upload_count: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            results: Vec::new(),
            partial_failure: None,
            failure: None,
        }
    }

    pub fn with_results(mut self, results: Vec<ClickConversionResult>) -> Self {
        self.results = results;
        self
    }

    pub fn with_partial_failure(mut self, message: &str, failures: Vec<ProviderFailure>) -> Self {
        self.partial_failure = Some(PartialFailureStatus {
            code: 3,
            message: message.to_string(),
            failures,
        });
        self
    }

    /// Fail every upload with an API error carrying `failure`
    pub fn with_api_failure(mut self, failure: ProviderFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn upload_call_count(&self) -> usize {
        self.upload_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<UploadClickConversionsRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|request| request.clone())
    }
}

#[async_trait]
impl ConversionUploadProvider for MockConversionProvider {
    async fn upload_click_conversions(
        &self,
        request: &UploadClickConversionsRequest,
    ) -> Result<UploadClickConversionsResponse, ProviderError> {
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(failure) = &self.failure {
            return Err(ProviderError::Api {
                status: 400,
                message: "Request contains an invalid argument.".to_string(),
                failures: vec![failure.clone()],
            });
        }

        Ok(UploadClickConversionsResponse {
            partial_failure_error: self.partial_failure.clone(),
            results: self.results.clone(),
        })
    }

    fn provider_type(&self) -> ConversionProviderType {
        ConversionProviderType::GoogleAds
    }
}
