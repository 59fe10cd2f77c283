use chrono::NaiveDate;
use log::info;

use crate::errors::{Result, LmeHubError};
use crate::models::record::PriceRecord;
use std::collections::HashMap;
use std::path::Path;

/// Price data provider backed by the exported CSV file.
///
/// The analysis stage treats the file as immutable session input: records
/// are loaded once, indexed by date and held in ascending date order.
#[derive(Debug)]
pub struct PriceDataProvider {
    records: Vec<PriceRecord>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceDataProvider {
    /// Load records from the exported CSV file
    pub fn load_from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(LmeHubError::DataFileMissing(path.to_string()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result?;

            let date_str = row
                .get(0)
                .ok_or_else(|| LmeHubError::DataError("Missing date column".to_string()))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?;

            records.push(PriceRecord::new(
                date,
                parse_optional_f64(row.get(1))?,
                parse_optional_f64(row.get(2))?,
                parse_optional_i64(row.get(3))?,
            ));
        }

        let mut provider = Self {
            records,
            date_index: HashMap::new(),
        };
        provider.rebuild_index();

        if let (Some(first), Some(last)) = (provider.records.first(), provider.records.last()) {
            info!(
                "Loaded {} records from {} to {}",
                provider.records.len(),
                first.date,
                last.date
            );
        }

        Ok(provider)
    }

    /// Create a provider instance from already-collected records
    pub fn new_with_data(records: Vec<PriceRecord>) -> Self {
        let mut provider = Self {
            records,
            date_index: HashMap::new(),
        };
        provider.rebuild_index();
        provider
    }

    /// All records in ascending date order
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a specific date
    pub fn get_by_date(&self, date: &NaiveDate) -> Option<&PriceRecord> {
        self.date_index.get(date).map(|&idx| &self.records[idx])
    }

    /// First and last date in the dataset
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    fn rebuild_index(&mut self) {
        // Load order comes from the collector, which already sorted, but a
        // hand-edited file must not break the ordering invariant
        self.records.sort_by_key(|record| record.date);

        self.date_index.clear();
        for (i, record) in self.records.iter().enumerate() {
            self.date_index.insert(record.date, i);
        }
    }
}

fn parse_optional_f64(cell: Option<&str>) -> Result<Option<f64>> {
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|e| LmeHubError::DataError(format!("Invalid number '{}': {}", value, e))),
    }
}

fn parse_optional_i64(cell: Option<&str>) -> Result<Option<i64>> {
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|e| LmeHubError::DataError(format!("Invalid integer '{}': {}", value, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn indexes_records_by_date() {
        let provider = PriceDataProvider::new_with_data(vec![
            PriceRecord::new(ymd(2025, 1, 13), Some(9600.00), None, Some(150_000)),
            PriceRecord::new(ymd(2025, 1, 14), Some(9700.00), None, None),
        ]);

        assert_eq!(provider.len(), 2);
        let record = provider.get_by_date(&ymd(2025, 1, 14)).unwrap();
        assert_eq!(record.cash_settlement, Some(9700.00));
        assert!(provider.get_by_date(&ymd(2025, 1, 15)).is_none());
    }

    #[test]
    fn reorders_out_of_order_input() {
        let provider = PriceDataProvider::new_with_data(vec![
            PriceRecord::new(ymd(2025, 2, 1), None, None, None),
            PriceRecord::new(ymd(2024, 2, 1), None, None, None),
        ]);

        assert_eq!(
            provider.date_range(),
            Some((ymd(2024, 2, 1), ymd(2025, 2, 1)))
        );
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let err = PriceDataProvider::load_from_file("data/does_not_exist.csv").unwrap_err();
        assert!(matches!(err, LmeHubError::DataFileMissing(_)));
    }
}
