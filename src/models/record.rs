use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of LME copper data.
///
/// The date is the unique key; numeric fields stay `None` when the source
/// cell was empty, a placeholder dash, or unparsable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub cash_settlement: Option<f64>,
    pub three_month: Option<f64>,
    pub stock: Option<i64>,
}

impl PriceRecord {
    pub fn new(
        date: NaiveDate,
        cash_settlement: Option<f64>,
        three_month: Option<f64>,
        stock: Option<i64>,
    ) -> Self {
        Self {
            date,
            cash_settlement,
            three_month,
            stock,
        }
    }
}
