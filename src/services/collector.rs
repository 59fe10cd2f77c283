use crate::config::Config;
use crate::errors::Result;
use crate::models::record::PriceRecord;
use crate::normalize;
use crate::scrapers::base::PriceScraper;
use chrono::{Datelike, Local};
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collector service: fetches page variants in order, normalizes rows into
/// records, deduplicates by date and writes the final CSV.
pub struct CollectorService {
    config: Config,
    scraper: Arc<dyn PriceScraper + Send + Sync>,
    csv_path: PathBuf,
}

/// Convert raw table rows from one page into candidate records.
///
/// A row needs at least four cells. A row whose date cell does not parse is
/// dropped entirely; rows with unparsable numeric cells are kept with those
/// fields absent.
pub fn rows_to_records(rows: &[Vec<String>]) -> Vec<PriceRecord> {
    let mut records = Vec::new();

    for cells in rows {
        if cells.len() < 4 {
            continue;
        }

        let date = match normalize::normalize_date(&cells[0]) {
            Some(date) => date,
            None => continue,
        };

        records.push(PriceRecord::new(
            date,
            normalize::normalize_price(&cells[1]),
            normalize::normalize_price(&cells[2]),
            normalize::normalize_stock(&cells[3]),
        ));
    }

    records
}

/// Deduplicate by date and sort ascending.
///
/// When the same date shows up on multiple pages, the record encountered
/// first in crawl order is kept. Input order therefore matters and must come
/// from a deterministic page sequence.
pub fn merge_records(records: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut seen_dates = HashSet::new();
    let mut unique: Vec<PriceRecord> = records
        .into_iter()
        .filter(|record| seen_dates.insert(record.date))
        .collect();

    unique.sort_by_key(|record| record.date);
    unique
}

impl CollectorService {
    /// Create a new collector service instance
    pub fn new(config: Config, scraper: Arc<dyn PriceScraper + Send + Sync>) -> Self {
        let csv_path = PathBuf::from(&config.data_dir).join(&config.csv_filename);
        Self {
            config,
            scraper,
            csv_path,
        }
    }

    /// Path of the exported CSV file
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Fetch every page variant sequentially and return the merged records.
    ///
    /// A failed page contributes zero records and never aborts the run.
    pub async fn collect(&self) -> Result<Vec<PriceRecord>> {
        let current_year = Local::now().year();
        info!(
            "Collecting LME copper data from {} to {} via {}",
            self.config.start_year,
            current_year,
            self.scraper.source_code()
        );

        let mut urls = self.scraper.page_urls(self.config.start_year, current_year);

        if self.config.debug_mode {
            let original_count = urls.len();
            urls.truncate(self.config.debug_page_limit);
            info!(
                "DEBUG MODE: Processing only {} out of {} pages",
                urls.len(),
                original_count
            );
        }

        let mut collected = Vec::new();

        for url in &urls {
            match self.scraper.fetch_page_rows(url).await {
                Ok(rows) => {
                    let records = rows_to_records(&rows);
                    info!("Found {} records from {}", records.len(), url);
                    collected.extend(records);
                }
                Err(e) => {
                    error!("Error scraping {}: {}", url, e);
                }
            }
        }

        let before_dedup = collected.len();
        let merged = merge_records(collected);
        info!(
            "Total unique records collected: {} ({} before dedup)",
            merged.len(),
            before_dedup
        );

        if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
            info!("Date range found: {} to {}", first.date, last.date);
        }

        Ok(merged)
    }

    /// Write the merged records to the CSV export file
    pub fn save_to_csv(&self, records: &[PriceRecord]) -> Result<PathBuf> {
        if records.is_empty() {
            warn!("No data to save");
            return Ok(self.csv_path.clone());
        }

        if let Some(parent) = self.csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        write_csv(records, &self.csv_path)?;

        info!("Data saved to {}", self.csv_path.display());
        info!("Total records: {}", records.len());

        Ok(self.csv_path.clone())
    }
}

/// CSV column layout matches the analyzer's expectations: ISO date plus the
/// three value columns, absent fields as empty cells, prices to two places.
pub fn write_csv(records: &[PriceRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "date",
        "lme_copper_cash_settlement",
        "lme_copper_3_month",
        "lme_copper_stock",
    ])?;

    for record in records {
        writer.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record
                .cash_settlement
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default(),
            record
                .three_month
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default(),
            record.stock.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_records_from_valid_rows() {
        let rows = vec![row(&["11. July 2025", "9,637.50", "9,650.00", "108,725"])];
        let records = rows_to_records(&rows);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, ymd(2025, 7, 11));
        assert_eq!(records[0].cash_settlement, Some(9637.50));
        assert_eq!(records[0].three_month, Some(9650.00));
        assert_eq!(records[0].stock, Some(108_725));
    }

    #[test]
    fn drops_rows_with_unparsable_dates() {
        let rows = vec![
            row(&["not a date", "9,637.50", "9,650.00", "108,725"]),
            row(&["11. July 2025", "9,637.50", "9,650.00", "108,725"]),
        ];

        assert_eq!(rows_to_records(&rows).len(), 1);
    }

    #[test]
    fn drops_rows_with_too_few_cells() {
        let rows = vec![row(&["11. July 2025", "9,637.50", "9,650.00"])];
        assert!(rows_to_records(&rows).is_empty());
    }

    #[test]
    fn keeps_rows_with_missing_numeric_cells() {
        let rows = vec![row(&["11. July 2025", "9,637.50", "", ""])];
        let records = rows_to_records(&rows);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cash_settlement, Some(9637.50));
        assert_eq!(records[0].three_month, None);
        assert_eq!(records[0].stock, None);
    }

    #[test]
    fn dash_placeholders_become_absent() {
        let rows = vec![row(&["11. July 2025", "-", "9,650.00", "-"])];
        let records = rows_to_records(&rows);

        assert_eq!(records[0].cash_settlement, None);
        assert_eq!(records[0].stock, None);
    }

    #[test]
    fn dedup_keeps_first_record_per_date() {
        let records = vec![
            PriceRecord::new(ymd(2025, 1, 13), Some(9600.00), Some(9650.00), Some(150_000)),
            PriceRecord::new(ymd(2025, 1, 13), Some(9700.00), Some(9750.00), Some(151_000)),
        ];

        let merged = merge_records(records);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].cash_settlement, Some(9600.00));
    }

    #[test]
    fn merge_sorts_ascending_regardless_of_arrival_order() {
        let records = vec![
            PriceRecord::new(ymd(2025, 3, 1), Some(1.0), None, None),
            PriceRecord::new(ymd(2024, 1, 1), Some(2.0), None, None),
            PriceRecord::new(ymd(2025, 1, 1), Some(3.0), None, None),
        ];

        let merged = merge_records(records);
        let dates: Vec<NaiveDate> = merged.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2025, 1, 1), ymd(2025, 3, 1)]);
    }
}
