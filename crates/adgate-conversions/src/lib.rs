//! Server-side conversion uploads for Adgate
//!
//! This crate takes a conversion event from an ad click and uploads it to
//! Google Ads `uploadClickConversions`:
//! - Identity fields (email, phone, names) are normalized and SHA-256 hashed
//! - One record per call, always in partial failure mode
//! - Responses are classified into success, partial failure or upstream error
//!
//! The HTTP surface lives in [`handlers`]; [`services::ConversionService`] can
//! also be used directly.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod providers;
pub mod record;
pub mod services;

// Re-export main types
pub use config::GoogleAdsConfig;
pub use errors::{ConversionError, ProviderError};
pub use identity::{build_identity_bundle, hash, normalize, IdentifierKind, IdentityBundle};
pub use providers::{ConversionUploadProvider, GoogleAdsCredentials, GoogleAdsProvider};
pub use record::{build_record, ClickConversionRecord, ConversionEvent};
pub use services::{ConversionService, UploadOutcome, UploadReceipt};
