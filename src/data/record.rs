//! Record types flowing through the pipeline.
//! RawRecord (loader) -> CleanRecord (normalizer) -> SalesRecord (aggregator).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One ingested CSV row, untyped. Missing cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub product: String,
    pub price: String,
    pub quantity: String,
    pub date: String,
    pub region: String,
}

/// A row that passed the product filter and every coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRecord {
    pub price: Decimal,
    pub quantity: u64,
    pub date: NaiveDate,
    pub region: String,
}

impl CleanRecord {
    /// `quantity * price`, or `None` when the product overflows `Decimal`.
    pub fn sales(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

/// Final output row: `sales = quantity * price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    pub sales: Decimal,
    pub date: NaiveDate,
    pub region: String,
}
