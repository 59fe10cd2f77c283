// Publicly exported modules for library consumers
pub mod models;
pub mod data_provider;
pub mod errors;

// Kept public to support the binary; treat as internal in library use
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod normalize;
#[doc(hidden)]
pub mod analysis;

// Re-export commonly used types
pub use models::record::PriceRecord;
pub use data_provider::PriceDataProvider;
pub use errors::{Result, LmeHubError};
