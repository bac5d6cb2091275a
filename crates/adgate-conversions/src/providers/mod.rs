//! Conversion upload provider abstractions and implementations

mod credentials;
mod google_ads;
mod traits;

#[cfg(test)]
pub mod mock;

pub use credentials::GoogleAdsCredentials;
pub use google_ads::GoogleAdsProvider;
pub use traits::*;

#[cfg(test)]
pub use mock::MockConversionProvider;
