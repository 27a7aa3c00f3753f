//! Wire types for the `/market-data` endpoint.
//!
//! Providers name fields in either long form (`open`) or short form (`o`), and send
//! numbers either as JSON numbers or numeric strings. Each pair resolves to a
//! [`Field`] so the derivation step in `convert.rs` never looks at input shape.

use crate::shared::serde_util;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response envelope from `POST /market-data`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataResponse {
    pub data: Vec<ProviderRecord>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A number as the provider sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

impl WireNumber {
    /// `None` for strings that do not parse or values that are not finite.
    pub fn to_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// A date as the provider sent it: ISO string or epoch millis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireDate {
    Millis(i64),
    Text(String),
}

impl WireDate {
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Millis(ms) => serde_util::date_from_millis(*ms),
            Self::Text(s) => serde_util::parse_date_str(s),
        }
    }
}

/// One raw provider row. Every field is optional; resolution happens in [`ProviderRecord::decode`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderRecord {
    pub timestamp: Option<WireDate>,
    pub date: Option<WireDate>,
    pub open: Option<WireNumber>,
    pub o: Option<WireNumber>,
    pub close: Option<WireNumber>,
    pub c: Option<WireNumber>,
    pub high: Option<WireNumber>,
    pub h: Option<WireNumber>,
    pub low: Option<WireNumber>,
    pub l: Option<WireNumber>,
    pub volume: Option<WireNumber>,
    pub v: Option<WireNumber>,
    pub volatility: Option<WireNumber>,
    pub liquidity: Option<WireNumber>,
    pub performance: Option<WireNumber>,
}

/// Which spelling a value came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<T> {
    Long(T),
    Short(T),
    Absent,
}

impl<T: Copy> Field<T> {
    /// Long form wins when both are present.
    pub fn resolve(long: Option<T>, short: Option<T>) -> Self {
        match (long, short) {
            (Some(v), _) => Field::Long(v),
            (None, Some(v)) => Field::Short(v),
            (None, None) => Field::Absent,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Field::Long(v) | Field::Short(v) => Some(v),
            Field::Absent => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.value().unwrap_or(default)
    }
}

/// Shape-independent view of a provider row.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub date: Field<NaiveDate>,
    pub open: Field<f64>,
    pub close: Field<f64>,
    pub high: Field<f64>,
    pub low: Field<f64>,
    pub volume: Field<f64>,
    pub volatility: Option<f64>,
    pub liquidity: Option<f64>,
    pub performance: Option<f64>,
}

fn num(v: &Option<WireNumber>) -> Option<f64> {
    v.as_ref().and_then(WireNumber::to_f64)
}

impl ProviderRecord {
    pub fn decode(&self) -> DecodedRecord {
        DecodedRecord {
            date: Field::resolve(
                self.timestamp.as_ref().and_then(WireDate::to_date),
                self.date.as_ref().and_then(WireDate::to_date),
            ),
            open: Field::resolve(num(&self.open), num(&self.o)),
            close: Field::resolve(num(&self.close), num(&self.c)),
            high: Field::resolve(num(&self.high), num(&self.h)),
            low: Field::resolve(num(&self.low), num(&self.l)),
            volume: Field::resolve(num(&self.volume), num(&self.v)),
            volatility: num(&self.volatility),
            liquidity: num(&self.liquidity),
            performance: num(&self.performance),
        }
    }
}
