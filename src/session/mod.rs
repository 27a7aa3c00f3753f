//! Data lifecycle controller.
//!
//! A [`MarketDataSession`] combines a [`MarketDataSource`], a [`CacheStore`] and a
//! [`FallbackGenerator`] into one observable state machine:
//!
//! ```text
//! Idle ──fetch──▶ Loading ──▶ Ready | ReadyStale | Failed
//!                   ▲                    │
//!                   └──── refresh ───────┘
//! ```
//!
//! Consumers read snapshots through [`MarketDataSession::state`], a
//! `watch::Receiver`, or a `Stream`. The session owns its poll and visibility
//! tasks; both are aborted on [`shutdown`](MarketDataSession::shutdown) or drop.

mod controller;
mod tasks;

use crate::cache::CacheStore;
use crate::clock::{Clock, SystemClock};
use crate::domain::market_data::{
    DailyRecord, FallbackGenerator, MarketDataSource, QueryDescriptor, SyntheticGenerator,
};
use crate::error::{SdkError, SessionError};

use chrono::{DateTime, Utc};
use futures_util::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use controller::Inner;

/// Default re-fetch period when polling is enabled.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Age after which a focus signal triggers a refresh.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    /// Live or cached data.
    Ready,
    /// Synthetic data standing in for a failed or empty retrieval.
    ReadyStale,
    Failed,
}

/// Where the current `data` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataOrigin {
    #[default]
    None,
    Live,
    Cache,
    Synthetic,
}

/// Snapshot of a session. Replaced wholesale on every settled fetch.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub data: Vec<DailyRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_stale: bool,
    pub origin: DataOrigin,
    /// The descriptor of the most recent fetch, used by refreshes.
    pub query: Option<QueryDescriptor>,
}

impl SessionState {
    /// True when `data` is synthetic ("Sample Data" rather than live).
    pub fn is_sample_data(&self) -> bool {
        self.origin == DataOrigin::Synthetic
    }
}

/// Result of one `fetch_data` / `refresh_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result was applied and the session settled in this phase.
    Applied(Phase),
    /// A newer fetch started before this one finished; its result was dropped.
    Superseded,
    /// The session was shut down; its result was dropped.
    Detached,
}

/// Visibility of the consuming surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub fallback_to_mock: bool,
    pub enable_cache: bool,
    pub enable_polling: bool,
    pub polling_interval: Duration,
    pub stale_after: Duration,
    /// Synthetic series length. `None` means the query's `span_days()`.
    pub fallback_days: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fallback_to_mock: true,
            enable_cache: true,
            enable_polling: false,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            stale_after: DEFAULT_STALE_AFTER,
            fallback_days: None,
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A stateful market data session.
///
/// Not `Clone`: share it behind an `Arc`. Dropping it tears the session down.
pub struct MarketDataSession {
    inner: Arc<Inner>,
}

impl MarketDataSession {
    pub fn builder(source: Arc<dyn MarketDataSource>) -> MarketDataSessionBuilder {
        MarketDataSessionBuilder::new(source)
    }

    /// Fetch `query` through cache, source and fallback, and apply the result.
    pub async fn fetch_data(&self, query: QueryDescriptor) -> FetchOutcome {
        self.inner.fetch(query).await
    }

    /// Re-fetch the most recent descriptor.
    pub async fn refresh_data(&self) -> Result<FetchOutcome, SessionError> {
        let query = self.inner.last_query().ok_or(SessionError::NoQuery)?;
        Ok(self.inner.fetch(query).await)
    }

    pub fn clear_error(&self) {
        self.inner.clear_error();
    }

    /// Empty the cache store. Session state is untouched.
    pub async fn clear_cache(&self) {
        if let Some(cache) = self.inner.cache() {
            cache.clear().await;
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.subscribe()
    }

    /// Snapshots after each change. Ends when the session is dropped.
    pub fn updates(&self) -> Pin<Box<dyn Stream<Item = SessionState> + Send + 'static>> {
        Box::pin(futures_util::stream::unfold(
            self.inner.subscribe(),
            |mut rx| async move {
                rx.changed().await.ok()?;
                let snapshot = rx.borrow_and_update().clone();
                Some((snapshot, rx))
            },
        ))
    }

    pub fn config(&self) -> &SessionConfig {
        self.inner.config()
    }

    /// The cache store, when caching is enabled.
    pub fn cache(&self) -> Option<&Arc<CacheStore>> {
        self.inner.cache()
    }

    /// Whether the displayed data is stale or older than `stale_after`.
    pub fn is_refresh_due(&self) -> bool {
        self.inner.is_refresh_due()
    }

    /// Focus regained: start a background refresh if one is due.
    /// Returns whether a refresh was started.
    pub fn notify_focus(&self) -> bool {
        tasks::notify_focus(&self.inner)
    }

    /// Start the poll task. Returns `false` if already running, shut down,
    /// or called outside a Tokio runtime.
    pub fn start_polling(&self) -> bool {
        tasks::start_polling(&self.inner)
    }

    pub fn stop_polling(&self) {
        self.inner.stop_polling();
    }

    pub fn is_polling(&self) -> bool {
        self.inner.is_polling()
    }

    /// Refresh on every `Visibility::Visible` received on `rx`. Replaces any
    /// previously attached receiver.
    pub fn attach_visibility(&self, rx: mpsc::Receiver<Visibility>) -> bool {
        tasks::attach_visibility(&self.inner, rx)
    }

    /// Abort background tasks and discard any in-flight result.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }
}

impl Drop for MarketDataSession {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MarketDataSessionBuilder {
    source: Arc<dyn MarketDataSource>,
    config: SessionConfig,
    cache: Option<Arc<CacheStore>>,
    fallback: Option<Arc<dyn FallbackGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    initial_query: Option<QueryDescriptor>,
}

impl MarketDataSessionBuilder {
    fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            config: SessionConfig::default(),
            cache: None,
            fallback: None,
            clock: None,
            initial_query: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fallback_to_mock(mut self, enabled: bool) -> Self {
        self.config.fallback_to_mock = enabled;
        self
    }

    pub fn enable_cache(mut self, enabled: bool) -> Self {
        self.config.enable_cache = enabled;
        self
    }

    pub fn enable_polling(mut self, enabled: bool) -> Self {
        self.config.enable_polling = enabled;
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.config.polling_interval = interval;
        self
    }

    pub fn stale_after(mut self, age: Duration) -> Self {
        self.config.stale_after = age;
        self
    }

    pub fn fallback_days(mut self, days: u32) -> Self {
        self.config.fallback_days = Some(days);
        self
    }

    /// Share a cache store with other sessions.
    pub fn cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn FallbackGenerator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Descriptor fetched by [`build_and_fetch`](Self::build_and_fetch).
    pub fn initial_query(mut self, query: QueryDescriptor) -> Self {
        self.initial_query = Some(query);
        self
    }

    pub fn build(self) -> Result<MarketDataSession, SdkError> {
        let (session, _) = self.build_parts()?;
        Ok(session)
    }

    /// Build, then run the initial fetch if one was configured.
    pub async fn build_and_fetch(self) -> Result<MarketDataSession, SdkError> {
        let (session, initial) = self.build_parts()?;
        if let Some(query) = initial {
            session.fetch_data(query).await;
        }
        Ok(session)
    }

    fn build_parts(self) -> Result<(MarketDataSession, Option<QueryDescriptor>), SdkError> {
        if self.config.fallback_days == Some(0) {
            return Err(SdkError::Config("fallback_days must be positive".into()));
        }
        if self.config.polling_interval.is_zero() {
            return Err(SdkError::Config("polling_interval must be positive".into()));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = if self.config.enable_cache {
            Some(
                self.cache
                    .unwrap_or_else(|| Arc::new(CacheStore::with_clock(clock.clone()))),
            )
        } else {
            None
        };
        let fallback = self.fallback.unwrap_or_else(|| {
            Arc::new(SyntheticGenerator::new().with_clock(clock.clone()))
        });

        let enable_polling = self.config.enable_polling;
        let inner = Arc::new(Inner::new(self.source, cache, fallback, clock, self.config));
        let session = MarketDataSession { inner };

        if enable_polling && !session.start_polling() {
            return Err(SdkError::Config("polling requires a running Tokio runtime".into()));
        }

        Ok((session, self.initial_query))
    }
}
