//! Google Ads OAuth credentials and access token caching

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{ConversionError, ProviderError};

/// Refresh this long before the provider-reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Credentials used to authorize Google Ads API calls
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoogleAdsCredentials {
    /// A ready-made access token, used as is
    AccessToken { access_token: String },
    /// OAuth client plus refresh token, exchanged for short-lived access tokens
    OAuthRefresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl std::fmt::Debug for GoogleAdsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleAdsCredentials::AccessToken { .. } => f
                .debug_struct("AccessToken")
                .field("access_token", &"<redacted>")
                .finish(),
            GoogleAdsCredentials::OAuthRefresh { client_id, .. } => f
                .debug_struct("OAuthRefresh")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("refresh_token", &"<redacted>")
                .finish(),
        }
    }
}

impl GoogleAdsCredentials {
    /// Pick credentials from optional settings.
    ///
    /// A complete refresh-token triple wins over a static access token.
    pub fn from_parts(
        access_token: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<Self, ConversionError> {
        match (client_id, client_secret, refresh_token, access_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token), _) => {
                Ok(GoogleAdsCredentials::OAuthRefresh {
                    client_id,
                    client_secret,
                    refresh_token,
                })
            }
            (None, None, None, Some(access_token)) => {
                Ok(GoogleAdsCredentials::AccessToken { access_token })
            }
            (None, None, None, None) => Err(ConversionError::Configuration(
                "Google Ads credentials are missing: set an access token or \
                 client id, client secret and refresh token"
                    .to_string(),
            )),
            _ => Err(ConversionError::Configuration(
                "Incomplete OAuth credentials: client id, client secret and refresh token \
                 must all be set"
                    .to_string(),
            )),
        }
    }
}

/// Token response from Google OAuth
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_after: Instant,
}

/// Hands out bearer tokens, refreshing and caching them as needed.
pub(crate) struct TokenSource {
    client: Client,
    token_url: String,
    credentials: GoogleAdsCredentials,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    pub(crate) fn new(client: Client, token_url: String, credentials: GoogleAdsCredentials) -> Self {
        Self {
            client,
            token_url,
            credentials,
            cached: RwLock::new(None),
        }
    }

    /// Get an access token for API requests
    pub(crate) async fn access_token(&self) -> Result<String, ProviderError> {
        match &self.credentials {
            GoogleAdsCredentials::AccessToken { access_token } => Ok(access_token.clone()),
            GoogleAdsCredentials::OAuthRefresh {
                client_id,
                client_secret,
                refresh_token,
            } => {
                {
                    let cached = self.cached.read().await;
                    if let Some(token) = cached.as_ref() {
                        if Instant::now() < token.refresh_after {
                            return Ok(token.access_token.clone());
                        }
                    }
                }

                self.refresh(client_id, client_secret, refresh_token).await
            }
        }
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub(crate) async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        *cached = None;
    }

    async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<String, ProviderError> {
        debug!("Refreshing Google Ads access token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Authentication(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Authentication(format!(
                "Failed to refresh access token ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::Authentication(format!("Failed to parse token response: {}", e))
        })?;

        let lifetime = Duration::from_secs(token_response.expires_in).saturating_sub(REFRESH_MARGIN);
        let token = CachedToken {
            access_token: token_response.access_token,
            refresh_after: Instant::now() + lifetime,
        };

        {
            let mut cached = self.cached.write().await;
            *cached = Some(token.clone());
        }

        Ok(token.access_token)
    }
}
