mod shutdown;

use adgate_conversions::config::{
    DEFAULT_API_BASE_URL, DEFAULT_API_VERSION, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_URL,
};
use adgate_conversions::handlers::{configure_routes, AppState, ConversionApiDoc};
use adgate_conversions::{ConversionService, GoogleAdsConfig, GoogleAdsCredentials, GoogleAdsProvider};
use axum::Router;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use shutdown::shutdown_signal;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8000", env = "ADGATE_ADDRESS")]
    pub address: String,

    /// Google Ads customer id receiving the conversions (dashes allowed)
    #[arg(long, env = "ADGATE_GOOGLE_ADS_CUSTOMER_ID")]
    pub customer_id: String,

    /// Google Ads developer token
    #[arg(long, env = "ADGATE_GOOGLE_ADS_DEVELOPER_TOKEN", hide_env_values = true)]
    pub developer_token: String,

    /// Manager account id to act through
    #[arg(long, env = "ADGATE_GOOGLE_ADS_LOGIN_CUSTOMER_ID")]
    pub login_customer_id: Option<String>,

    /// Static OAuth access token, used when no refresh token is configured
    #[arg(long, env = "ADGATE_GOOGLE_ADS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// OAuth client id
    #[arg(long, env = "ADGATE_GOOGLE_ADS_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "ADGATE_GOOGLE_ADS_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth refresh token
    #[arg(long, env = "ADGATE_GOOGLE_ADS_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Google Ads API version
    #[arg(long, default_value = DEFAULT_API_VERSION, env = "ADGATE_GOOGLE_ADS_API_VERSION")]
    pub api_version: String,

    /// Google Ads API base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL, env = "ADGATE_GOOGLE_ADS_API_BASE_URL")]
    pub api_base_url: String,

    /// OAuth token endpoint
    #[arg(long, default_value = DEFAULT_TOKEN_URL, env = "ADGATE_GOOGLE_ADS_TOKEN_URL")]
    pub token_url: String,

    /// Ask Google Ads to validate uploads without recording them
    #[arg(long, env = "ADGATE_GOOGLE_ADS_VALIDATE_ONLY")]
    pub validate_only: bool,

    /// Timeout for Google Ads requests, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "ADGATE_GOOGLE_ADS_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Bearer token required on conversion routes
    #[arg(long, env = "ADGATE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let config = self.google_ads_config()?;
        debug!("Google Ads configuration: {:?}", config);

        let provider = GoogleAdsProvider::new(&config)?;
        let conversion_service = Arc::new(ConversionService::new(
            Arc::new(provider),
            &config.customer_id,
        ));

        if self.api_token.is_none() {
            warn!("ADGATE_API_TOKEN is not set, conversion routes are unauthenticated");
        }

        let state = Arc::new(AppState {
            conversion_service,
            api_token: self.api_token.clone(),
        });

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(serve(self.address.clone(), state))
    }

    fn google_ads_config(&self) -> anyhow::Result<GoogleAdsConfig> {
        let credentials = GoogleAdsCredentials::from_parts(
            self.access_token.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
            self.refresh_token.clone(),
        )?;

        let mut config =
            GoogleAdsConfig::new(&self.customer_id, self.developer_token.clone(), credentials)
                .with_login_customer_id(self.login_customer_id.as_deref());
        config.api_version = self.api_version.clone();
        config.api_base_url = self.api_base_url.clone();
        config.token_url = self.token_url.clone();
        config.validate_only = self.validate_only;
        config.request_timeout_secs = self.request_timeout_secs;

        config.validate()?;
        Ok(config)
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    configure_routes(state.clone())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ConversionApiDoc::openapi()))
}

async fn serve(address: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_app(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Adgate conversion gateway listening on http://{}", address);
    info!("API docs available at http://{}/swagger-ui", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Adgate conversion gateway exited");
    Ok(())
}
