//! Conversion events and the provider record built from them

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::errors::ConversionError;
use crate::identity::{build_identity_bundle, IdentityBundle};

/// `YYYY-MM-DD HH:MM:SS±HHMM`
pub const CONVERSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// A validated conversion to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionEvent {
    /// Click identifier from the ad click
    pub gclid: String,
    /// Conversion action resource name
    pub conversion_action: String,
    /// Monetary value in currency units
    pub conversion_value: Decimal,
    /// ISO 4217 currency code
    pub currency_code: String,
    pub conversion_time: DateTime<FixedOffset>,
    /// Merchant order id; the provider deduplicates uploads sharing one
    pub order_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ConversionEvent {
    /// Check the event invariants: non-blank identifiers, a positive value
    /// and a three letter currency code.
    pub fn validate(&self) -> Result<(), ConversionError> {
        if self.gclid.trim().is_empty() {
            return Err(ConversionError::Validation("gclid is required".to_string()));
        }

        if self.conversion_action.trim().is_empty() {
            return Err(ConversionError::Validation(
                "conversion_action is required".to_string(),
            ));
        }

        if self.conversion_value <= Decimal::ZERO {
            return Err(ConversionError::Validation(format!(
                "conversion_value must be greater than 0, got {}",
                self.conversion_value
            )));
        }

        if self.currency_code.chars().count() != 3
            || !self.currency_code.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConversionError::Validation(format!(
                "currency_code must be a 3-letter code, got '{}'",
                self.currency_code
            )));
        }

        Ok(())
    }
}

/// The record sent to the provider for one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickConversionRecord {
    pub gclid: String,
    pub conversion_action: String,
    pub conversion_value: Decimal,
    pub currency_code: String,
    /// Formatted with [`CONVERSION_TIME_FORMAT`]
    pub conversion_date_time: String,
    pub order_id: Option<String>,
    pub identity: Option<IdentityBundle>,
}

pub fn format_conversion_time(time: &DateTime<FixedOffset>) -> String {
    time.format(CONVERSION_TIME_FORMAT).to_string()
}

/// Map an event onto the provider record. Pure: no I/O.
pub fn build_record(event: &ConversionEvent) -> ClickConversionRecord {
    ClickConversionRecord {
        gclid: event.gclid.clone(),
        conversion_action: event.conversion_action.clone(),
        conversion_value: event.conversion_value,
        currency_code: event.currency_code.clone(),
        conversion_date_time: format_conversion_time(&event.conversion_time),
        order_id: event.order_id.clone(),
        identity: build_identity_bundle(event),
    }
}
