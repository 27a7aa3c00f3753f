//! Low-level HTTP client, `MarketDataHttp`.
//!
//! One method per endpoint, returning wire types. Conversion to domain records
//! happens in `domain::market_data::convert`; the high-level client wraps this.

use crate::domain::instrument::wire::InstrumentsResponse;
use crate::domain::market_data::wire::MarketDataResponse;
use crate::domain::market_data::QueryDescriptor;
use crate::error::{FetchError, SdkError};
use crate::http::retry::RetryPolicy;
use crate::network::{INSTRUMENTS_PATH, MARKET_DATA_PATH};

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub struct MarketDataHttp {
    base_url: String,
    client: Client,
    /// Bearer key. Shared with clones so rotation reaches every handle.
    api_key: Arc<RwLock<Option<String>>>,
}

impl MarketDataHttp {
    pub fn new(base_url: &str, timeout: Duration, api_key: Option<String>) -> Result<Self, SdkError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| SdkError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            api_key: Arc::new(RwLock::new(api_key.filter(|k| !k.is_empty()))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the bearer key. Empty strings clear it.
    pub async fn set_api_key(&self, key: Option<String>) {
        *self.api_key.write().await = key.filter(|k| !k.is_empty());
    }

    pub async fn has_api_key(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    // ── Market data ──────────────────────────────────────────────────────

    /// Single attempt; the session decides what a failure means.
    pub async fn post_market_data(&self, query: &QueryDescriptor) -> Result<MarketDataResponse, FetchError> {
        let url = format!("{}{}", self.base_url, MARKET_DATA_PATH);
        self.post(&url, query, RetryPolicy::None).await
    }

    // ── Instruments ──────────────────────────────────────────────────────

    pub async fn get_instruments(&self) -> Result<InstrumentsResponse, FetchError> {
        let url = format!("{}{}", self.base_url, INSTRUMENTS_PATH);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str, retry: RetryPolicy) -> Result<T, FetchError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, retry)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
        retry: RetryPolicy,
    ) -> Result<T, FetchError> {
        self.request_with_retry(reqwest::Method::POST, url, Some(body), retry)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, FetchError> {
        let Some(config) = retry.config() else {
            return self.do_request(&method, url, body).await;
        };

        let mut attempt = 0;
        loop {
            match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < config.max_retries && config.should_retry(&e) => {
                    let delay = config.delay_for_attempt(attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request to {}: {}",
                        url,
                        e
                    );
                    futures_timer::Delay::new(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, FetchError> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(key) = self.api_key.read().await.as_ref() {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        // `.json` also sets `Content-Type: application/json`.
        if let Some(b) = body {
            req = req.json(b);
        }

        tracing::debug!("{} {}", method, url);
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(FetchError::ApiStatus {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl Clone for MarketDataHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            api_key: self.api_key.clone(),
        }
    }
}
