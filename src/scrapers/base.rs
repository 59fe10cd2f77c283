use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for commodity price page scrapers
#[async_trait]
pub trait PriceScraper {
    /// Short code identifying the data source
    fn source_code(&self) -> &'static str;

    /// Candidate page URLs covering `start_year` through `end_year`.
    ///
    /// The order is significant: the collector visits pages in exactly this
    /// order and keeps the first record seen per date, so the sequence must
    /// be deterministic across runs.
    fn page_urls(&self, start_year: i32, end_year: i32) -> Vec<String>;

    /// Fetch one page and return the raw data-table rows as cell text
    async fn fetch_page_rows(&self, url: &str) -> Result<Vec<Vec<String>>>;
}
