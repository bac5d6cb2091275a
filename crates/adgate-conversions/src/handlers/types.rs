//! Handler types for the conversion gateway

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::errors::ConversionError;
use crate::record::ConversionEvent;
use crate::services::{ConversionService, UploadReceipt};

/// Application state for conversion handlers
pub struct AppState {
    pub conversion_service: Arc<ConversionService>,
    /// Bearer token required on conversion routes, if set
    pub api_token: Option<String>,
}

fn default_currency_code() -> String {
    "BRL".to_string()
}

/// Google Ads conversion upload request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GoogleConversionRequest {
    /// Google Click ID from the ad click
    #[schema(example = "EAIaIQobChMI8Y3x")]
    pub gclid: String,
    /// Conversion action resource name
    #[schema(example = "customers/1234567890/conversionActions/987654321")]
    pub conversion_action: String,
    /// Monetary value of the conversion, greater than 0
    #[schema(value_type = f64, example = 1500.00)]
    pub conversion_value: Decimal,
    /// ISO 4217 currency code
    #[serde(default = "default_currency_code")]
    #[schema(example = "BRL", default = "BRL")]
    pub currency_code: String,
    /// When the conversion happened, RFC 3339 with offset
    #[schema(value_type = String, format = DateTime, example = "2025-11-17T15:30:00-03:00")]
    pub conversion_time: DateTime<FixedOffset>,
    /// Merchant order id, used by Google Ads to drop duplicate uploads
    #[serde(default)]
    pub order_id: Option<String>,

    // Enhanced conversion fields, hashed before leaving the gateway
    #[serde(default)]
    #[schema(example = "customer@example.com")]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "+55 11 99999-9999")]
    pub phone: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl GoogleConversionRequest {
    /// Convert into a validated [`ConversionEvent`].
    pub fn into_event(self) -> Result<ConversionEvent, ConversionError> {
        let event = ConversionEvent {
            gclid: self.gclid.trim().to_string(),
            conversion_action: self.conversion_action.trim().to_string(),
            conversion_value: self.conversion_value,
            currency_code: self.currency_code.trim().to_ascii_uppercase(),
            conversion_time: self.conversion_time,
            order_id: self
                .order_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            email: self.email,
            phone: self.phone,
            first_name: self.first_name,
            last_name: self.last_name,
        };

        event.validate()?;
        Ok(event)
    }
}

/// Response after a successful conversion upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionResponse {
    #[schema(example = "success")]
    pub status: String,
    /// Conversion action reported by Google Ads, or `unknown`
    #[schema(example = "customers/1234567890/conversionActions/987654321")]
    pub conversion_id: String,
    #[schema(example = "Conversion uploaded successfully for gclid: EAIaIQobChMI8Y3x")]
    pub message: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<UploadReceipt> for ConversionResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            status: "success".to_string(),
            conversion_id: receipt.provider_id,
            message: receipt.message,
            uploaded_at: receipt.uploaded_at,
        }
    }
}

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}
