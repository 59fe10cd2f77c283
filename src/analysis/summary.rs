//! Descriptive statistics over the loaded price records.

use crate::models::record::PriceRecord;
use chrono::{Datelike, NaiveDate};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Trading days per year, used to annualize rolling volatility
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Per-series descriptive statistics
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Dataset-level summary
#[derive(Debug, Clone)]
pub struct Summary {
    pub total_records: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub span_years: f64,
    pub cash: SeriesStats,
    pub three_month: SeriesStats,
    pub stock: SeriesStats,
}

/// Per-year aggregates, mirroring the report's yearly table
#[derive(Debug, Clone)]
pub struct YearlySummary {
    pub year: i32,
    pub cash_mean: Option<f64>,
    pub cash_min: Option<f64>,
    pub cash_max: Option<f64>,
    pub cash_std: Option<f64>,
    pub three_month_mean: Option<f64>,
    pub three_month_min: Option<f64>,
    pub three_month_max: Option<f64>,
    pub three_month_std: Option<f64>,
    pub stock_mean: Option<f64>,
    pub stock_min: Option<f64>,
    pub stock_max: Option<f64>,
}

/// One point of the rolling volatility series
#[derive(Debug, Clone)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    pub cash: Option<f64>,
    pub three_month: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn series_stats(values: &[f64], total: usize) -> SeriesStats {
    if values.is_empty() {
        return SeriesStats {
            count: 0,
            missing: total,
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    // Sample std-dev needs at least two observations
    let std_dev = if values.len() > 1 {
        Statistics::std_dev(values.iter())
    } else {
        0.0
    };

    SeriesStats {
        count: values.len(),
        missing: total - values.len(),
        mean: round2(Statistics::mean(values.iter())),
        std_dev: round2(std_dev),
        min: round2(Statistics::min(values.iter())),
        max: round2(Statistics::max(values.iter())),
    }
}

fn cash_values(records: &[PriceRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| r.cash_settlement).collect()
}

fn three_month_values(records: &[PriceRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| r.three_month).collect()
}

fn stock_values(records: &[PriceRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| r.stock.map(|v| v as f64)).collect()
}

/// Compute the dataset summary. `None` when there are no records.
pub fn summary(records: &[PriceRecord]) -> Option<Summary> {
    let first = records.first()?;
    let last = records.last()?;
    let total = records.len();

    let span_days = (last.date - first.date).num_days() as f64;

    Some(Summary {
        total_records: total,
        first_date: first.date,
        last_date: last.date,
        span_years: (span_days / 365.25 * 10.0).round() / 10.0,
        cash: series_stats(&cash_values(records), total),
        three_month: series_stats(&three_month_values(records), total),
        stock: series_stats(&stock_values(records), total),
    })
}

fn agg(values: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None, None, None);
    }
    let std = if values.len() > 1 {
        Some(round2(Statistics::std_dev(values.iter())))
    } else {
        Some(0.0)
    };
    (
        Some(round2(Statistics::mean(values.iter()))),
        Some(round2(Statistics::min(values.iter()))),
        Some(round2(Statistics::max(values.iter()))),
        std,
    )
}

/// Group records by calendar year and aggregate each series
pub fn yearly_summary(records: &[PriceRecord]) -> Vec<YearlySummary> {
    let mut by_year: BTreeMap<i32, Vec<&PriceRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.date.year()).or_default().push(record);
    }

    by_year
        .into_iter()
        .map(|(year, year_records)| {
            let cash: Vec<f64> = year_records.iter().filter_map(|r| r.cash_settlement).collect();
            let three: Vec<f64> = year_records.iter().filter_map(|r| r.three_month).collect();
            let stock: Vec<f64> = year_records
                .iter()
                .filter_map(|r| r.stock.map(|v| v as f64))
                .collect();

            let (cash_mean, cash_min, cash_max, cash_std) = agg(&cash);
            let (three_month_mean, three_month_min, three_month_max, three_month_std) = agg(&three);
            let (stock_mean, stock_min, stock_max, _) = agg(&stock);

            YearlySummary {
                year,
                cash_mean,
                cash_min,
                cash_max,
                cash_std,
                three_month_mean,
                three_month_min,
                three_month_max,
                three_month_std,
                stock_mean,
                stock_min,
                stock_max,
            }
        })
        .collect()
}

/// Day-over-day returns for one series, aligned with the record index.
/// `None` when either endpoint of the day pair is missing.
fn returns(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    for i in 1..values.len() {
        if let (Some(prev), Some(curr)) = (values[i - 1], values[i]) {
            if prev != 0.0 {
                result[i] = Some((curr - prev) / prev);
            }
        }
    }
    result
}

/// Rolling sample std-dev of returns over `window` days, annualized by
/// sqrt(252). A window containing any missing return yields `None`.
fn rolling_std(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; returns.len()];
    if window < 2 {
        return result;
    }

    for i in (window - 1)..returns.len() {
        let slice = &returns[i + 1 - window..=i];
        let values: Vec<f64> = slice.iter().filter_map(|r| *r).collect();
        if values.len() == window {
            result[i] = Some(Statistics::std_dev(values.iter()) * TRADING_DAYS_PER_YEAR.sqrt());
        }
    }
    result
}

/// Rolling annualized volatility for both price series
pub fn rolling_volatility(records: &[PriceRecord], window: usize) -> Vec<VolatilityPoint> {
    let cash: Vec<Option<f64>> = records.iter().map(|r| r.cash_settlement).collect();
    let three: Vec<Option<f64>> = records.iter().map(|r| r.three_month).collect();

    let cash_vol = rolling_std(&returns(&cash), window);
    let three_vol = rolling_std(&returns(&three), window);

    records
        .iter()
        .enumerate()
        .map(|(i, record)| VolatilityPoint {
            date: record.date,
            cash: cash_vol[i],
            three_month: three_vol[i],
        })
        .collect()
}

/// Column labels for the correlation matrix, in matrix order
pub const CORRELATION_LABELS: [&str; 3] = [
    "lme_copper_cash_settlement",
    "lme_copper_3_month",
    "lme_copper_stock",
];

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
    let mean_x = Statistics::mean(xs.iter());
    let mean_y = Statistics::mean(ys.iter());

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

fn column(records: &[PriceRecord], idx: usize) -> Vec<Option<f64>> {
    records
        .iter()
        .map(|r| match idx {
            0 => r.cash_settlement,
            1 => r.three_month,
            _ => r.stock.map(|v| v as f64),
        })
        .collect()
}

/// Pairwise Pearson correlation over rows where both fields are present
pub fn correlation_matrix(records: &[PriceRecord]) -> [[f64; 3]; 3] {
    let columns: Vec<Vec<Option<f64>>> = (0..3).map(|i| column(records, i)).collect();
    let mut matrix = [[f64::NAN; 3]; 3];

    for i in 0..3 {
        for j in 0..3 {
            let pairs: Vec<(f64, f64)> = columns[i]
                .iter()
                .zip(columns[j].iter())
                .filter_map(|(a, b)| match (a, b) {
                    (Some(a), Some(b)) => Some((*a, *b)),
                    _ => None,
                })
                .collect();
            matrix[i][j] = pearson(&pairs);
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, cash: f64, three: f64, stock: i64) -> PriceRecord {
        PriceRecord::new(date, Some(cash), Some(three), Some(stock))
    }

    #[test]
    fn summary_of_empty_dataset_is_none() {
        assert!(summary(&[]).is_none());
    }

    #[test]
    fn summary_counts_missing_fields() {
        let records = vec![
            record(ymd(2025, 1, 13), 9600.00, 9650.00, 150_000),
            PriceRecord::new(ymd(2025, 1, 14), Some(9700.00), None, None),
        ];

        let s = summary(&records).unwrap();
        assert_eq!(s.total_records, 2);
        assert_eq!(s.cash.missing, 0);
        assert_eq!(s.three_month.missing, 1);
        assert_eq!(s.stock.missing, 1);
        assert_eq!(s.cash.mean, 9650.00);
        assert_eq!(s.cash.min, 9600.00);
        assert_eq!(s.cash.max, 9700.00);
    }

    #[test]
    fn yearly_summary_groups_by_calendar_year() {
        let records = vec![
            record(ymd(2024, 6, 1), 9000.00, 9100.00, 100_000),
            record(ymd(2024, 6, 2), 9200.00, 9300.00, 110_000),
            record(ymd(2025, 1, 2), 9600.00, 9700.00, 150_000),
        ];

        let years = yearly_summary(&records);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2024);
        assert_eq!(years[0].cash_mean, Some(9100.00));
        assert_eq!(years[0].stock_max, Some(110_000.0));
        assert_eq!(years[1].year, 2025);
        assert_eq!(years[1].cash_std, Some(0.0));
    }

    #[test]
    fn rolling_volatility_needs_a_full_window() {
        let records: Vec<PriceRecord> = (1..=5)
            .map(|d| record(ymd(2025, 1, d), 9000.0 + d as f64 * 10.0, 9100.0, 100_000))
            .collect();

        let vol = rolling_volatility(&records, 3);
        assert_eq!(vol.len(), 5);
        // First two points cannot cover a 3-day return window
        assert!(vol[0].cash.is_none());
        assert!(vol[1].cash.is_none());
        assert!(vol[3].cash.is_some());
        // Flat series has zero volatility
        assert_eq!(vol[4].three_month, Some(0.0));
    }

    #[test]
    fn correlation_of_identical_series_is_one() {
        let records: Vec<PriceRecord> = (1..=10)
            .map(|d| {
                let v = 9000.0 + d as f64 * 25.0;
                record(ymd(2025, 1, d), v, v, 100_000 + d as i64)
            })
            .collect();

        let matrix = correlation_matrix(&records);
        assert!((matrix[0][0] - 1.0).abs() < 1e-9);
        assert!((matrix[0][1] - 1.0).abs() < 1e-9);
        assert!((matrix[1][0] - matrix[0][1]).abs() < 1e-9);
    }

    #[test]
    fn correlation_skips_rows_with_missing_fields() {
        let records = vec![
            record(ymd(2025, 1, 1), 9000.0, 9100.0, 100_000),
            PriceRecord::new(ymd(2025, 1, 2), Some(9050.0), None, Some(100_500)),
            record(ymd(2025, 1, 3), 9100.0, 9300.0, 101_000),
        ];

        let matrix = correlation_matrix(&records);
        // cash vs 3-month uses only the two complete rows
        assert!((matrix[0][1] - 1.0).abs() < 1e-9);
    }
}
