use crate::errors::{Result, LmeHubError};
use crate::scrapers::base::PriceScraper;
use crate::scrapers::extract;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const BASE_URL: &str = "https://www.westmetall.com/en/markdaten.php";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Westmetall market data scraper for LME copper
pub struct WestmetallScraper {
    client: Client,
    last_request: Mutex<Option<Instant>>,
    request_delay: Duration,
}

impl WestmetallScraper {
    /// Create a new scraper with the given timeout and inter-request delay
    pub fn new(timeout_secs: u64, request_delay_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(LmeHubError::RequestError)?;

        Ok(Self {
            client,
            last_request: Mutex::new(None),
            request_delay: Duration::from_millis(request_delay_ms),
        })
    }

    /// Wait out the politeness delay between requests
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let should_wait = {
            let mut last = self.last_request.lock().unwrap();
            let should_wait = if let Some(instant) = *last {
                let elapsed = instant.elapsed();
                if elapsed < self.request_delay {
                    Some(self.request_delay - elapsed)
                } else {
                    None
                }
            } else {
                None
            };
            *last = Some(now);
            should_wait
        };

        if let Some(wait_time) = should_wait {
            debug!("Waiting {:?} to respect rate limit", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }
}

#[async_trait]
impl PriceScraper for WestmetallScraper {
    fn source_code(&self) -> &'static str {
        "WESTMETALL"
    }

    fn page_urls(&self, start_year: i32, end_year: i32) -> Vec<String> {
        // Main current-data page first, then year variants newest-first.
        // The site has served all three year-parameter spellings at various
        // times, so every variant is tried; the first page that yields a
        // given date wins.
        let mut urls = vec![format!("{}?action=table&field=LME_Cu_cash", BASE_URL)];

        let mut year = end_year;
        while year >= start_year {
            urls.push(format!(
                "{}?action=table&field=LME_Cu_cash&year={}",
                BASE_URL, year
            ));
            urls.push(format!(
                "{}?action=table&field=LME_Cu_cash&periode={}",
                BASE_URL, year
            ));
            urls.push(format!(
                "{}?action=table&field=LME_Cu_cash&from={}-01-01&to={}-12-31",
                BASE_URL, year, year
            ));
            year -= 1;
        }

        urls
    }

    async fn fetch_page_rows(&self, url: &str) -> Result<Vec<Vec<String>>> {
        info!("Scraping: {}", url);

        self.wait_for_rate_limit().await;

        let response = self.client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(LmeHubError::RequestError)?;

        if !response.status().is_success() {
            return Err(LmeHubError::DataError(format!(
                "HTTP status {} for {}",
                response.status(),
                url
            )));
        }

        let html = response.text().await?;
        let rows = extract::data_table_rows(&html);

        debug!("Extracted {} raw rows from {}", rows.len(), url);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_order_is_deterministic_and_newest_first() {
        let scraper = WestmetallScraper::new(15, 0).unwrap();
        let urls = scraper.page_urls(2023, 2025);

        // 1 main page + 3 variants per year
        assert_eq!(urls.len(), 1 + 3 * 3);
        assert_eq!(urls[0], format!("{}?action=table&field=LME_Cu_cash", BASE_URL));
        assert!(urls[1].ends_with("&year=2025"));
        assert!(urls[2].ends_with("&periode=2025"));
        assert!(urls[3].ends_with("&from=2025-01-01&to=2025-12-31"));
        assert!(urls[4].ends_with("&year=2024"));
        assert!(urls[9].ends_with("&from=2023-01-01&to=2023-12-31"));
    }

    #[test]
    fn single_year_range_produces_four_urls() {
        let scraper = WestmetallScraper::new(15, 0).unwrap();
        assert_eq!(scraper.page_urls(2025, 2025).len(), 4);
    }
}
