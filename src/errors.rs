use thiserror::Error;
use std::num::ParseIntError;

#[derive(Error, Debug)]
pub enum LmeHubError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Chart rendering error: {0}")]
    ChartError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Data file not found: {0}")]
    DataFileMissing(String),

    #[error("Parse int error: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, LmeHubError>;

impl From<String> for LmeHubError {
    fn from(s: String) -> Self {
        LmeHubError::Unknown(s)
    }
}

impl From<&str> for LmeHubError {
    fn from(s: &str) -> Self {
        LmeHubError::Unknown(s.to_string())
    }
}
