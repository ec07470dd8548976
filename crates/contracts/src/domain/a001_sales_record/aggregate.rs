use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names every sales dataset must carry, in report order
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Region", "Rep", "Product", "Sales"];

/// One sales row: who sold what, where and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Rep")]
    pub rep: String,
    #[serde(rename = "Product")]
    pub product: String,
    /// Сумма продажи; возвраты отрицательные
    #[serde(rename = "Sales")]
    pub sales: f64,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        region: impl Into<String>,
        rep: impl Into<String>,
        product: impl Into<String>,
        sales: f64,
    ) -> Self {
        Self {
            date,
            region: region.into(),
            rep: rep.into(),
            product: product.into(),
            sales,
        }
    }
}
