//! Period rollups: fold daily records into week and month summaries for calendar cells.
//!
//! Weeks run Sunday through Saturday. All functions here are pure; the caller owns
//! the series and may call them per view request.

use super::{AggregatedRecord, DailyRecord};
use crate::shared::Timeframe;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Fold one period's records into a summary anchored at `anchor`.
///
/// `records` must be sorted ascending by date; `open` comes from the first and
/// `close` from the last. Returns `None` for an empty slice.
pub fn aggregate(
    records: &[DailyRecord],
    anchor: NaiveDate,
    period: Timeframe,
) -> Option<AggregatedRecord> {
    let first = records.first()?;
    let last = records.last()?;
    let n = records.len() as f64;

    let open = first.open;
    let close = last.close;
    let high = records.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max);
    let low = records.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
    let volume = records.iter().map(|r| r.volume).sum();
    let volatility = records.iter().map(|r| r.volatility).sum::<f64>() / n;
    let liquidity = records.iter().map(|r| r.liquidity).sum::<f64>() / n;

    // Period-over-period return, not the mean of daily returns.
    let performance = if open == 0.0 { 0.0 } else { (close - open) / open };

    Some(AggregatedRecord {
        date: anchor,
        period,
        open,
        close,
        high,
        low,
        volume,
        volatility,
        liquidity,
        performance,
    })
}

/// First calendar day of the period containing `date`.
pub fn period_start(date: NaiveDate, timeframe: Timeframe) -> NaiveDate {
    match timeframe {
        Timeframe::Day => date,
        Timeframe::Week => date - Duration::days(date.weekday().num_days_from_sunday() as i64),
        Timeframe::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Last calendar day of the period containing `date`.
pub fn period_end(date: NaiveDate, timeframe: Timeframe) -> NaiveDate {
    match timeframe {
        Timeframe::Day => date,
        Timeframe::Week => period_start(date, Timeframe::Week) + Duration::days(6),
        Timeframe::Month => last_day_of_month(date.year(), date.month()).unwrap_or(date),
    }
}

/// Group a series by period and aggregate each group, ascending by anchor.
///
/// Unlike [`aggregate`], input order does not matter. A sorted copy is grouped.
pub fn aggregate_by_period(series: &[DailyRecord], timeframe: Timeframe) -> Vec<AggregatedRecord> {
    let mut groups: BTreeMap<NaiveDate, Vec<DailyRecord>> = BTreeMap::new();
    for record in series {
        groups
            .entry(period_start(record.date, timeframe))
            .or_default()
            .push(record.clone());
    }

    groups
        .into_iter()
        .filter_map(|(anchor, mut records)| {
            records.sort_by_key(|r| r.date);
            aggregate(&records, anchor, timeframe)
        })
        .collect()
}

/// Records with `start <= date <= end`, in series order.
pub fn records_in_range(series: &[DailyRecord], start: NaiveDate, end: NaiveDate) -> Vec<DailyRecord> {
    series
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .cloned()
        .collect()
}

/// Date-indexed view of a series for day cells. Later duplicates win.
pub fn daily_lookup(series: &[DailyRecord]) -> BTreeMap<NaiveDate, DailyRecord> {
    series.iter().map(|r| (r.date, r.clone())).collect()
}

/// One row of the weekly calendar view.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekCell {
    /// 1-based position within the month view.
    pub index: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: Option<AggregatedRecord>,
}

/// One cell of the monthly (year) calendar view.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCell {
    /// 1-based month number.
    pub month: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: Option<AggregatedRecord>,
}

/// Every Sunday-started week overlapping `year`/`month`, from the week holding the
/// 1st through the week holding the last day. Weeks spilling into neighbouring
/// months aggregate all their days, not just in-month ones.
pub fn weekly_calendar(series: &[DailyRecord], year: i32, month: u32) -> Vec<WeekCell> {
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(year, month, 1),
        last_day_of_month(year, month),
    ) else {
        return Vec::new();
    };

    let by_date = daily_lookup(series);
    let grid_end = period_end(last, Timeframe::Week);
    let mut cells = Vec::new();
    let mut week_start = period_start(first, Timeframe::Week);
    let mut index = 1;

    while week_start <= grid_end {
        let week_end = week_start + Duration::days(6);
        let days: Vec<DailyRecord> = by_date.range(week_start..=week_end).map(|(_, r)| r.clone()).collect();
        cells.push(WeekCell {
            index,
            start: week_start,
            end: week_end,
            summary: aggregate(&days, week_start, Timeframe::Week),
        });
        week_start += Duration::days(7);
        index += 1;
    }

    cells
}

/// Twelve month cells for `year`.
pub fn monthly_calendar(series: &[DailyRecord], year: i32) -> Vec<MonthCell> {
    let by_date = daily_lookup(series);
    (1..=12)
        .filter_map(|month| {
            let start = NaiveDate::from_ymd_opt(year, month, 1)?;
            let end = last_day_of_month(year, month)?;
            let days: Vec<DailyRecord> = by_date.range(start..=end).map(|(_, r)| r.clone()).collect();
            Some(MonthCell {
                month,
                start,
                end,
                summary: aggregate(&days, start, Timeframe::Month),
            })
        })
        .collect()
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[allow(clippy::too_many_arguments)]
    fn rec(
        date: NaiveDate,
        open: f64,
        close: f64,
        high: f64,
        low: f64,
        volume: f64,
        volatility: f64,
        liquidity: f64,
        performance: f64,
    ) -> DailyRecord {
        DailyRecord {
            date,
            open,
            close,
            high,
            low,
            volume,
            volatility,
            liquidity,
            performance,
        }
    }

    fn flat(date: NaiveDate, price: f64) -> DailyRecord {
        rec(date, price, price, price + 1.0, price - 1.0, 10.0, 0.01, 50.0, 0.0)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_two_day_scenario() {
        let records = vec![
            rec(day(2024, 1, 1), 100.0, 110.0, 112.0, 98.0, 1000.0, 0.05, 60.0, 0.1),
            rec(day(2024, 1, 2), 110.0, 105.0, 111.0, 103.0, 2000.0, 0.03, 70.0, -0.045),
        ];
        let agg = aggregate(&records, day(2024, 1, 1), Timeframe::Month).unwrap();
        assert_eq!(agg.date, day(2024, 1, 1));
        assert_eq!(agg.open, 100.0);
        assert_eq!(agg.close, 105.0);
        assert_eq!(agg.high, 112.0);
        assert_eq!(agg.low, 98.0);
        assert_eq!(agg.volume, 3000.0);
        assert_close(agg.volatility, 0.04);
        assert_close(agg.liquidity, 65.0);
        assert_close(agg.performance, 0.05);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(aggregate(&[], day(2024, 1, 1), Timeframe::Week).is_none());
    }

    #[test]
    fn test_zero_open_performance_is_zero() {
        let records = vec![rec(day(2024, 1, 1), 0.0, 5.0, 6.0, 0.0, 1.0, 0.0, 0.0, 0.0)];
        let agg = aggregate(&records, day(2024, 1, 1), Timeframe::Week).unwrap();
        assert_eq!(agg.performance, 0.0);
    }

    #[test]
    fn test_high_low_are_extremes_for_any_subset() {
        let month: Vec<DailyRecord> = (1..=31)
            .map(|d| {
                let base = 100.0 + ((d * 37) % 11) as f64;
                rec(day(2024, 1, d), base, base + 0.5, base + (d % 4) as f64 + 1.0, base - (d % 3) as f64 - 1.0, 1.0, 0.01, 50.0, 0.0)
            })
            .collect();

        for start in 0..month.len() {
            for end in start + 1..=month.len() {
                let subset = &month[start..end];
                let agg = aggregate(subset, day(2024, 1, 1), Timeframe::Month).unwrap();
                let max_high = subset.iter().map(|r| r.high).fold(f64::MIN, f64::max);
                let min_low = subset.iter().map(|r| r.low).fold(f64::MAX, f64::min);
                assert_eq!(agg.high, max_high);
                assert_eq!(agg.low, min_low);
                assert_close(agg.performance, (agg.close - agg.open) / agg.open);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let records = vec![flat(day(2024, 5, 1), 10.0), flat(day(2024, 5, 2), 12.5)];
        let a = aggregate(&records, day(2024, 5, 1), Timeframe::Month);
        let b = aggregate(&records, day(2024, 5, 1), Timeframe::Month);
        assert_eq!(a, b);
    }

    #[test]
    fn test_period_boundaries() {
        // 2024-01-03 is a Wednesday.
        assert_eq!(period_start(day(2024, 1, 3), Timeframe::Week), day(2023, 12, 31));
        assert_eq!(period_end(day(2024, 1, 3), Timeframe::Week), day(2024, 1, 6));
        assert_eq!(period_start(day(2024, 2, 17), Timeframe::Month), day(2024, 2, 1));
        assert_eq!(period_end(day(2024, 2, 17), Timeframe::Month), day(2024, 2, 29));
        assert_eq!(period_end(day(2023, 12, 5), Timeframe::Month), day(2023, 12, 31));
        assert_eq!(period_start(day(2024, 2, 17), Timeframe::Day), day(2024, 2, 17));
    }

    #[test]
    fn test_aggregate_by_period_sorts_and_groups() {
        let series = vec![
            flat(day(2024, 2, 2), 20.0),
            flat(day(2024, 1, 15), 10.0),
            flat(day(2024, 1, 2), 5.0),
        ];
        let months = aggregate_by_period(&series, Timeframe::Month);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].date, day(2024, 1, 1));
        assert_eq!(months[0].open, 5.0);
        assert_eq!(months[0].close, 10.0);
        assert_eq!(months[1].date, day(2024, 2, 1));

        let days = aggregate_by_period(&series, Timeframe::Day);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, day(2024, 1, 2));
    }

    #[test]
    fn test_weekly_calendar_covers_month() {
        // February 2024: the 1st is a Thursday, the 29th a Thursday.
        let series: Vec<DailyRecord> = (1..=29).map(|d| flat(day(2024, 2, d), d as f64)).collect();
        let weeks = weekly_calendar(&series, 2024, 2);
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0].start, day(2024, 1, 28));
        assert_eq!(weeks[0].end, day(2024, 2, 3));
        assert_eq!(weeks[4].end, day(2024, 3, 2));
        assert_eq!(weeks[0].index, 1);

        let first = weeks[0].summary.as_ref().unwrap();
        assert_eq!(first.date, day(2024, 1, 28));
        assert_eq!(first.open, 1.0);
        assert_eq!(first.close, 3.0);
    }

    #[test]
    fn test_weekly_calendar_empty_weeks_have_no_summary() {
        let series = vec![flat(day(2024, 2, 14), 10.0)];
        let weeks = weekly_calendar(&series, 2024, 2);
        let with_data: Vec<_> = weeks.iter().filter(|w| w.summary.is_some()).collect();
        assert_eq!(with_data.len(), 1);
        assert_eq!(with_data[0].start, day(2024, 2, 11));
    }

    #[test]
    fn test_monthly_calendar() {
        let series = vec![flat(day(2024, 3, 10), 10.0), flat(day(2024, 3, 20), 11.0)];
        let months = monthly_calendar(&series, 2024);
        assert_eq!(months.len(), 12);
        assert!(months[0].summary.is_none());
        let march = months[2].summary.as_ref().unwrap();
        assert_eq!(march.date, day(2024, 3, 1));
        assert_eq!(march.volume, 20.0);
        assert_eq!(months[11].end, day(2024, 12, 31));
    }

    #[test]
    fn test_records_in_range() {
        let series: Vec<DailyRecord> = (1..=10).map(|d| flat(day(2024, 4, d), 1.0)).collect();
        let slice = records_in_range(&series, day(2024, 4, 3), day(2024, 4, 5));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].date, day(2024, 4, 3));
    }
}
