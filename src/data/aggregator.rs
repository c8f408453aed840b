//! Sales Aggregator Module
//! Derives `sales = quantity * price`, sorts by date and serves region partitions.

use crate::data::{CleanRecord, SalesRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Region filter for partitioning: `"all"` or one region value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionSelector {
    All,
    Region(String),
}

impl RegionSelector {
    pub const ALL: &'static str = "all";

    pub fn matches(&self, region: &str) -> bool {
        match self {
            RegionSelector::All => true,
            RegionSelector::Region(r) => r == region,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegionSelector::All => Self::ALL,
            RegionSelector::Region(r) => r,
        }
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        RegionSelector::All
    }
}

impl FromStr for RegionSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == Self::ALL {
            Ok(RegionSelector::All)
        } else {
            Ok(RegionSelector::Region(s.to_string()))
        }
    }
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sales for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub sales: Decimal,
}

/// Immutable, date-sorted sales table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive sales for every clean record and stable-sort by date.
    /// Records whose sales overflow are skipped; `normalize` never emits them.
    pub fn aggregate(clean: Vec<CleanRecord>) -> Self {
        let mut records: Vec<SalesRecord> = clean
            .into_iter()
            .filter_map(|r| {
                let sales = r.sales()?;
                Some(SalesRecord {
                    sales,
                    date: r.date,
                    region: r.region,
                })
            })
            .collect();

        // `sort_by_key` is stable, so equal dates keep ingestion order
        records.sort_by_key(|r| r.date);

        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one region (or all), in date order.
    pub fn partition(&self, selector: &RegionSelector) -> Vec<&SalesRecord> {
        self.records
            .iter()
            .filter(|r| selector.matches(&r.region))
            .collect()
    }

    /// Distinct regions, sorted.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = self.records.iter().map(|r| r.region.clone()).collect();
        regions.sort();
        regions.dedup();
        regions
    }

    /// First and last date present, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date, last.date))
    }

    /// Sum of sales per date for a partition, ascending by date.
    /// Sums saturate at `Decimal::MAX`.
    pub fn daily_totals(&self, selector: &RegionSelector) -> Vec<DailyTotal> {
        let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for record in self.partition(selector) {
            let total = by_date.entry(record.date).or_default();
            *total = total.saturating_add(record.sales);
        }
        by_date
            .into_iter()
            .map(|(date, sales)| DailyTotal { date, sales })
            .collect()
    }

    pub fn total_sales(&self, selector: &RegionSelector) -> Decimal {
        self.partition(selector)
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.sales))
    }
}
