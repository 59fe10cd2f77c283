pub struct Config {
    pub debug_mode: bool,
    pub debug_page_limit: usize,
    pub data_dir: String,
    pub csv_filename: String,
    pub start_year: i32,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_page_limit: 5,
            data_dir: "data".to_string(),
            csv_filename: "lme_copper_historical_data.csv".to_string(),
            start_year: 2010,
            request_delay_ms: 1000,
            request_timeout_secs: 15,
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_page_limit(mut self, limit: usize) -> Self {
        self.debug_page_limit = limit;
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = year;
        self
    }

    pub fn with_request_delay_ms(mut self, delay: u64) -> Self {
        self.request_delay_ms = delay;
        self
    }

    pub fn with_request_timeout_secs(mut self, timeout: u64) -> Self {
        self.request_timeout_secs = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
