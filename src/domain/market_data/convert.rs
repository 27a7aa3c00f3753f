//! Conversion: ProviderRecord → DailyRecord, deriving fields the provider omits.

use super::wire::{DecodedRecord, ProviderRecord};
use super::DailyRecord;

/// A provider row that cannot become a [`DailyRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("row {index} has no usable date")]
    MissingDate { index: usize },
}

/// `(high − low) / close × 100`, 0 when `close == 0`.
pub fn derive_volatility(high: f64, low: f64, close: f64) -> f64 {
    if close == 0.0 {
        return 0.0;
    }
    (high - low) / close * 100.0
}

/// `min(volume × close / 1_000_000, 100)`, 0 when `close == 0`.
pub fn derive_liquidity(volume: f64, close: f64) -> f64 {
    if close == 0.0 {
        return 0.0;
    }
    (volume * close / 1_000_000.0).min(100.0)
}

/// `(close − open) / open × 100`, 0 when `open == 0`.
pub fn derive_performance(open: f64, close: f64) -> f64 {
    if open == 0.0 {
        return 0.0;
    }
    (close - open) / open * 100.0
}

impl DecodedRecord {
    fn into_daily(self, index: usize) -> Result<DailyRecord, ConvertError> {
        let date = self.date.value().ok_or(ConvertError::MissingDate { index })?;
        let open = self.open.unwrap_or(0.0);
        let close = self.close.unwrap_or(0.0);
        let high = self.high.unwrap_or(0.0);
        let low = self.low.unwrap_or(0.0);
        let volume = self.volume.unwrap_or(0.0);

        Ok(DailyRecord {
            date,
            open,
            close,
            high,
            low,
            volume,
            volatility: self
                .volatility
                .unwrap_or_else(|| derive_volatility(high, low, close)),
            liquidity: self
                .liquidity
                .unwrap_or_else(|| derive_liquidity(volume, close)),
            performance: self
                .performance
                .unwrap_or_else(|| derive_performance(open, close)),
        })
    }
}

impl ProviderRecord {
    pub fn to_daily(&self, index: usize) -> Result<DailyRecord, ConvertError> {
        self.decode().into_daily(index)
    }
}

/// Transform a provider payload, skipping rows without a usable date.
pub fn transform(rows: &[ProviderRecord]) -> Vec<DailyRecord> {
    let mut out = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match row.to_daily(index) {
            Ok(record) => out.push(record),
            Err(e) => tracing::warn!("Skipping provider row: {}", e),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows(json: &str) -> Vec<ProviderRecord> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_derives_missing_fields() {
        let out = transform(&rows(
            r#"[{"date":"2024-01-01","open":100,"close":110,"high":112,"low":98,"volume":50000}]"#,
        ));
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert!((r.volatility - (14.0 / 110.0 * 100.0)).abs() < 1e-9);
        assert!((r.liquidity - 5.5).abs() < 1e-9);
        assert!((r.performance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_supplied_fields_are_kept() {
        let out = transform(&rows(
            r#"[{"date":"2024-01-01","o":1,"c":2,"h":3,"l":0.5,"v":10,"volatility":0.2,"liquidity":77,"performance":-0.01}]"#,
        ));
        let r = &out[0];
        assert_eq!(r.open, 1.0);
        assert_eq!(r.volatility, 0.2);
        assert_eq!(r.liquidity, 77.0);
        assert_eq!(r.performance, -0.01);
    }

    #[test]
    fn test_liquidity_is_capped() {
        assert_eq!(derive_liquidity(1e9, 500.0), 100.0);
    }

    #[test]
    fn test_zero_denominators() {
        assert_eq!(derive_volatility(10.0, 5.0, 0.0), 0.0);
        assert_eq!(derive_liquidity(10.0, 0.0), 0.0);
        assert_eq!(derive_performance(0.0, 5.0), 0.0);

        let out = transform(&rows(r#"[{"date":"2024-01-01"}]"#));
        let r = &out[0];
        assert_eq!((r.open, r.close, r.volatility, r.liquidity, r.performance), (0.0, 0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rows_without_date_are_skipped() {
        let out = transform(&rows(
            r#"[{"open":1},{"date":"garbage"},{"timestamp":"2024-03-05T10:00:00Z","close":4}]"#,
        ));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_to_daily_leaves_row_intact() {
        let row = &rows(r#"[{"date":"2024-01-01","close":5},{"close":5}]"#);
        assert_eq!(row[0].to_daily(0).unwrap().close, 5.0);
        assert!(row[0].date.is_some());
        assert_eq!(row[1].to_daily(1), Err(ConvertError::MissingDate { index: 1 }));
    }
}
