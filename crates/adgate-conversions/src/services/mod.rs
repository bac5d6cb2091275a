//! Services for the conversion gateway

mod conversion_service;

pub use conversion_service::{ConversionService, UploadOutcome, UploadReceipt, UNKNOWN_PROVIDER_ID};
