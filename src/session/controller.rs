//! Fetch state machine and the shared session core.

use super::{DataOrigin, FetchOutcome, Phase, SessionConfig, SessionState};
use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::domain::market_data::synthetic::MAX_SYNTHETIC_DAYS;
use crate::domain::market_data::{
    DailyRecord, FallbackGenerator, MarketDataSource, QueryDescriptor, Retrieved,
};
use crate::error::SessionError;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background tasks owned by a session.
#[derive(Default)]
pub(super) struct Tasks {
    pub(super) poll: Option<JoinHandle<()>>,
    pub(super) visibility: Option<JoinHandle<()>>,
    pub(super) refresh: Option<JoinHandle<()>>,
}

impl Tasks {
    fn abort_all(&mut self) {
        for handle in [self.poll.take(), self.visibility.take(), self.refresh.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

pub(super) struct Inner {
    source: Arc<dyn MarketDataSource>,
    cache: Option<Arc<CacheStore>>,
    fallback: Arc<dyn FallbackGenerator>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    /// Bumped on every fetch start; a result applies only if it still matches.
    epoch: AtomicU64,
    alive: AtomicBool,
    tasks: Mutex<Tasks>,
}

/// A settled fetch, ready to replace the session state.
struct Settled {
    phase: Phase,
    data: Vec<DailyRecord>,
    error: Option<String>,
    is_stale: bool,
    origin: DataOrigin,
    stamped: bool,
}

impl Inner {
    pub(super) fn new(
        source: Arc<dyn MarketDataSource>,
        cache: Option<Arc<CacheStore>>,
        fallback: Arc<dyn FallbackGenerator>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            source,
            cache,
            fallback,
            clock,
            config,
            state,
            epoch: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            tasks: Mutex::new(Tasks::default()),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub(super) fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(super) fn cache(&self) -> Option<&Arc<CacheStore>> {
        self.cache.as_ref()
    }

    pub(super) fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub(super) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub(super) fn last_query(&self) -> Option<QueryDescriptor> {
        self.state.borrow().query.clone()
    }

    pub(super) fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub(super) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub(super) fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub(super) fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    pub(super) fn is_refresh_due(&self) -> bool {
        let state = self.state.borrow();
        if state.is_stale {
            return true;
        }
        let Some(last) = state.last_updated else {
            return false;
        };
        (self.clock.now() - last)
            .to_std()
            .map(|age| age > self.config.stale_after)
            .unwrap_or(false)
    }

    pub(super) fn is_polling(&self) -> bool {
        self.tasks().poll.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub(super) fn stop_polling(&self) {
        if let Some(handle) = self.tasks().poll.take() {
            handle.abort();
            tracing::debug!("Polling stopped");
        }
    }

    pub(super) fn shutdown(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            self.tasks().abort_all();
            tracing::debug!("Session shut down");
        }
    }

    // ── Fetch ────────────────────────────────────────────────────────────

    pub(super) async fn fetch(&self, query: QueryDescriptor) -> FetchOutcome {
        if !self.is_alive() {
            return FetchOutcome::Detached;
        }

        let mut epoch = 0;
        self.state.send_modify(|s| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            s.phase = Phase::Loading;
            s.loading = true;
            s.error = None;
            s.query = Some(query.clone());
        });

        let settled = self.resolve(&query).await;

        let mut outcome = FetchOutcome::Superseded;
        self.state.send_if_modified(|s| {
            if !self.is_alive() {
                outcome = FetchOutcome::Detached;
                return false;
            }
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            let now = self.clock.now();
            *s = SessionState {
                phase: settled.phase,
                data: settled.data,
                loading: false,
                error: settled.error,
                last_updated: settled.stamped.then_some(now),
                is_stale: settled.is_stale,
                origin: settled.origin,
                query: Some(query),
            };
            outcome = FetchOutcome::Applied(settled.phase);
            true
        });

        if outcome == FetchOutcome::Superseded {
            tracing::debug!("Discarding superseded fetch result");
        }
        outcome
    }

    async fn resolve(&self, query: &QueryDescriptor) -> Settled {
        if let Some(cache) = &self.cache {
            if let Some(series) = cache.get_query(query).await {
                tracing::debug!(instrument = %query.instrument(), "Serving from cache");
                return Settled::ready(series, DataOrigin::Cache);
            }
            tracing::debug!(instrument = %query.instrument(), "Cache miss");
        }

        let reason = match self.source.retrieve(query).await {
            Ok(Retrieved { series, .. }) if !series.is_empty() => {
                if let Some(cache) = &self.cache {
                    cache.set_query(query, series.clone()).await;
                }
                return Settled::ready(series, DataOrigin::Live);
            }
            Ok(Retrieved { message, .. }) => {
                let err = SessionError::EmptyResult {
                    instrument: query.instrument().clone(),
                    reason: message,
                };
                tracing::warn!("{}", err);
                err
            }
            Err(e) => SessionError::Fetch(e),
        };

        self.degrade(query, reason)
    }

    /// Substitute synthetic data for a failed or empty retrieval, if allowed.
    fn degrade(&self, query: &QueryDescriptor, reason: SessionError) -> Settled {
        if !self.config.fallback_to_mock {
            return Settled::failed(reason.to_string());
        }

        let days = self
            .config
            .fallback_days
            .unwrap_or_else(|| query.span_days())
            .min(MAX_SYNTHETIC_DAYS);
        match self.fallback.generate(query.instrument(), days) {
            Ok(series) => {
                tracing::warn!(
                    instrument = %query.instrument(),
                    days,
                    "API unavailable, using sample data: {}",
                    reason
                );
                Settled {
                    phase: Phase::ReadyStale,
                    data: series,
                    error: Some(format!("API unavailable: {}. Showing sample data.", reason)),
                    is_stale: true,
                    origin: DataOrigin::Synthetic,
                    stamped: true,
                }
            }
            Err(e) => {
                let err = SessionError::FallbackFailure {
                    api: reason.to_string(),
                    fallback: e.to_string(),
                };
                tracing::error!("{}", err);
                Settled::failed(err.to_string())
            }
        }
    }
}

impl Settled {
    fn ready(data: Vec<DailyRecord>, origin: DataOrigin) -> Self {
        Self {
            phase: Phase::Ready,
            data,
            error: None,
            is_stale: false,
            origin,
            stamped: true,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            phase: Phase::Failed,
            data: Vec::new(),
            error: Some(error),
            is_stale: false,
            origin: DataOrigin::None,
            stamped: false,
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.tasks().abort_all();
    }
}
