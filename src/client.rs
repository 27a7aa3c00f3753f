//! High-level client: `MarketDataClient` with nested sub-client accessors.
//!
//! Sub-clients live in `domain/<name>/client.rs`. This module keeps the
//! configuration, the builder, and the `MarketDataSource` implementation the
//! session depends on.

use crate::domain::instrument::client::Instruments;
use crate::domain::market_data::client::MarketData;
use crate::domain::market_data::{DailyRecord, MarketDataSource, QueryDescriptor, Retrieved};
use crate::error::{FetchError, SdkError};
use crate::http::MarketDataHttp;
use crate::network::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS, ENV_API_KEY, ENV_API_URL, ENV_TIMEOUT_MS};

use async_trait::async_trait;
use std::time::Duration;

pub use crate::domain::instrument::client::Instruments as InstrumentsClient;
pub use crate::domain::market_data::client::MarketData as MarketDataSubClient;

/// Endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    /// Read `MARKET_DATA_API_URL`, `MARKET_DATA_API_KEY` and
    /// `MARKET_DATA_TIMEOUT_MS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config.api_key = lookup(ENV_API_KEY).filter(|k| !k.is_empty());

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| SdkError::Config(format!("{} must be a whole number of milliseconds, got {:?}", ENV_TIMEOUT_MS, raw)))?;
            if ms == 0 {
                return Err(SdkError::Config(format!("{} must be positive", ENV_TIMEOUT_MS)));
            }
            config.timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

/// The retrieval entry point.
///
/// Provides nested sub-client accessors: `client.market_data()`,
/// `client.instruments()`.
pub struct MarketDataClient {
    pub(crate) http: MarketDataHttp,
    timeout: Duration,
}

impl MarketDataClient {
    pub fn builder() -> MarketDataClientBuilder {
        MarketDataClientBuilder::default()
    }

    pub fn from_env() -> Result<Self, SdkError> {
        MarketDataClientBuilder::from_config(ApiConfig::from_env()?).build()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn market_data(&self) -> MarketData<'_> {
        MarketData { client: self }
    }

    pub fn instruments(&self) -> Instruments<'_> {
        Instruments { client: self }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Rotate the bearer key. Applies to every clone of this client.
    pub async fn set_api_key(&self, key: Option<String>) {
        self.http.set_api_key(key).await;
    }
}

impl Clone for MarketDataClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            timeout: self.timeout,
        }
    }
}

#[async_trait]
impl MarketDataSource for MarketDataClient {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<DailyRecord>, FetchError> {
        Ok(self.retrieve(query).await?.series)
    }

    async fn retrieve(&self, query: &QueryDescriptor) -> Result<Retrieved, FetchError> {
        let retrieved = self.market_data().retrieve(query).await?;
        tracing::info!(
            instrument = %query.instrument(),
            records = retrieved.series.len(),
            "Fetched market data"
        );
        Ok(retrieved)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MarketDataClientBuilder {
    config: ApiConfig,
}

impl Default for MarketDataClientBuilder {
    fn default() -> Self {
        Self::from_config(ApiConfig::default())
    }
}

impl MarketDataClientBuilder {
    pub fn from_config(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<MarketDataClient, SdkError> {
        if self.config.base_url.trim().is_empty() {
            return Err(SdkError::Config("base URL must not be empty".into()));
        }
        let http = MarketDataHttp::new(&self.config.base_url, self.config.timeout, self.config.api_key)?;
        Ok(MarketDataClient {
            http,
            timeout: self.config.timeout,
        })
    }
}
