pub mod summary;
pub mod charts;
pub mod report;
