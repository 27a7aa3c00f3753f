//! Market data domain: daily records, period rollups, queries, retrieval seam.

pub mod aggregate;
#[cfg(feature = "http")]
pub mod client;
pub mod convert;
pub mod synthetic;
pub mod wire;

use crate::error::FetchError;
use crate::shared::serde_util::iso_date;
use crate::shared::{Instrument, Timeframe};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use aggregate::{aggregate, aggregate_by_period, period_end, period_start, MonthCell, WeekCell};
pub use synthetic::{FallbackGenerator, SyntheticGenerator, MAX_SYNTHETIC_DAYS};

/// One calendar day of market activity for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    /// Intraday range, normalized.
    pub volatility: f64,
    /// 0–100 ease-of-trading score.
    pub liquidity: f64,
    /// Signed return for the day.
    pub performance: f64,
}

impl DailyRecord {
    /// `low ≤ min(open, close) ≤ max(open, close) ≤ high`.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

/// A week or month summary. Derived view only, never cached or persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    /// First calendar day of the period.
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub period: Timeframe,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub volatility: f64,
    pub liquidity: f64,
    pub performance: f64,
}

/// Immutable market data query. Its canonical JSON form is both the
/// `/market-data` request body and the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    instrument: Instrument,
    #[serde(with = "iso_date")]
    start_date: NaiveDate,
    #[serde(with = "iso_date")]
    end_date: NaiveDate,
    timeframe: Timeframe,
    include_volatility: bool,
    include_liquidity: bool,
    include_performance: bool,
}

impl QueryDescriptor {
    /// Daily timeframe, all derived fields included.
    pub fn new(instrument: impl Into<Instrument>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            instrument: instrument.into(),
            start_date,
            end_date,
            timeframe: Timeframe::Day,
            include_volatility: true,
            include_liquidity: true,
            include_performance: true,
        }
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_volatility(mut self, include: bool) -> Self {
        self.include_volatility = include;
        self
    }

    pub fn with_liquidity(mut self, include: bool) -> Self {
        self.include_liquidity = include;
        self
    }

    pub fn with_performance(mut self, include: bool) -> Self {
        self.include_performance = include;
        self
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn include_volatility(&self) -> bool {
        self.include_volatility
    }

    pub fn include_liquidity(&self) -> bool {
        self.include_liquidity
    }

    pub fn include_performance(&self) -> bool {
        self.include_performance
    }

    /// Inclusive number of calendar days in the range, at least 1.
    pub fn span_days(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days() + 1;
        days.clamp(1, u32::MAX as i64) as u32
    }

    /// Canonical serialization: struct field order is fixed, so equal descriptors
    /// give equal keys regardless of how they were built.
    pub fn cache_key(&self) -> String {
        // A struct of strings, dates and bools cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{}|{}|{}|{}|{}|{}|{}",
                self.instrument,
                self.start_date,
                self.end_date,
                self.timeframe,
                self.include_volatility,
                self.include_liquidity,
                self.include_performance
            )
        })
    }
}

/// A retrieved series plus the provider's note when it declined the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieved {
    pub series: Vec<DailyRecord>,
    pub message: Option<String>,
}

/// The retrieval seam the lifecycle controller depends on.
///
/// An `Ok(vec![])` is a successful call; it is the caller's decision to treat
/// it as a miss.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<DailyRecord>, FetchError>;

    /// Like `fetch`, keeping any provider message. Sources without one use the default.
    async fn retrieve(&self, query: &QueryDescriptor) -> Result<Retrieved, FetchError> {
        Ok(Retrieved {
            series: self.fetch(query).await?,
            message: None,
        })
    }
}
