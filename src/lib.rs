//! # market-calendar
//!
//! Market data aggregation and retrieval for calendar-style dashboards.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: instruments, daily records, period rollups, synthetic series (always available)
//! 2. **Cache**: TTL-bounded series cache keyed by query fingerprint
//! 3. **HTTP API**: `MarketDataHttp` with per-endpoint retry policies
//! 4. **High-Level Client**: `MarketDataClient`, the live `MarketDataSource`
//! 5. **Session**: `MarketDataSession`, which runs cache then source then fallback and owns polling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use market_calendar::prelude::*;
//! use std::sync::Arc;
//!
//! let client = MarketDataClient::from_env()?;
//! let session = MarketDataSession::builder(Arc::new(client))
//!     .enable_polling(true)
//!     .build()?;
//!
//! let query = QueryDescriptor::new("BTC-USD", start, end);
//! session.fetch_data(query).await;
//!
//! let state = session.state();
//! let weeks = weekly_calendar(&state.data, 2024, 2);
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions.
pub mod domain;

/// Injectable time source.
pub mod clock;

/// Unified error types.
pub mod error;

/// Endpoint defaults and configuration keys.
pub mod network;

// ── Layer 2: Cache ───────────────────────────────────────────────────────────

pub mod cache;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `MarketDataClient`: the live retrieval entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 5: Session ─────────────────────────────────────────────────────────

/// `MarketDataSession`: the data lifecycle controller.
#[cfg(feature = "session")]
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Instrument, Timeframe};

    // Domain types: market data
    pub use crate::domain::market_data::aggregate::{
        aggregate, aggregate_by_period, daily_lookup, monthly_calendar, records_in_range,
        weekly_calendar, MonthCell, WeekCell,
    };
    pub use crate::domain::market_data::{
        AggregatedRecord, DailyRecord, FallbackGenerator, MarketDataSource, QueryDescriptor,
        Retrieved, SyntheticGenerator, MAX_SYNTHETIC_DAYS,
    };

    // Domain types: instruments
    pub use crate::domain::instrument::{InstrumentInfo, InstrumentListing, ListingOrigin};

    // Cache + clock
    pub use crate::cache::{CacheStore, CACHE_TTL};
    pub use crate::clock::{Clock, ManualClock, SystemClock};

    // Errors
    pub use crate::error::{FallbackError, FetchError, SdkError, SessionError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        ApiConfig, InstrumentsClient, MarketDataClient, MarketDataClientBuilder,
        MarketDataSubClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // Session
    #[cfg(feature = "session")]
    pub use crate::session::{
        DataOrigin, FetchOutcome, MarketDataSession, MarketDataSessionBuilder, Phase,
        SessionConfig, SessionState, Visibility,
    };
}
