//! Statistics Calculator Module
//! Compares daily sales before and after the event date, per region.

use crate::data::{RegionSelector, SalesTable};
use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics of daily sales totals over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub days: usize,
    pub total: Decimal,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
}

impl Default for PeriodStats {
    fn default() -> Self {
        Self {
            days: 0,
            total: Decimal::ZERO,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
        }
    }
}

/// Before/after comparison around the event date for one partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventImpact {
    pub region: String,
    pub event_date: NaiveDate,
    /// Days strictly before the event.
    pub before: PeriodStats,
    /// The event day and everything after it.
    pub after: PeriodStats,
    pub mean_change_pct: Option<f64>,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

impl EventImpact {
    /// True when mean daily sales rose after the event.
    pub fn sales_higher_after(&self) -> Option<bool> {
        if self.before.days == 0 || self.after.days == 0 {
            return None;
        }
        Some(self.after.mean > self.before.mean)
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for daily totals.
    pub fn compute_period_stats(totals: &[Decimal]) -> PeriodStats {
        let n = totals.len();
        if n == 0 {
            return PeriodStats::default();
        }

        let values: Vec<f64> = totals.iter().filter_map(|d| d.to_f64()).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = Self::percentile(&sorted, 50.0);
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        PeriodStats {
            days: n,
            total: totals
                .iter()
                .fold(Decimal::ZERO, |acc, t| acc.saturating_add(*t)),
            mean,
            median,
            std: variance.sqrt(),
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Welch's t-test p-value (two-tailed). `None` with fewer than two samples per side.
    pub fn welch_p_value(after: &[f64], before: &[f64]) -> Option<f64> {
        let n1 = after.len() as f64;
        let n2 = before.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return None;
        }

        let mean1 = after.iter().sum::<f64>() / n1;
        let mean2 = before.iter().sum::<f64>() / n2;

        let var1 = after.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
        let var2 = before.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return Some(if mean1 == mean2 { 1.0 } else { 0.0 });
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        Some(2.0 * (1.0 - dist.cdf(t.abs())))
    }

    /// Compare daily totals before and after `event_date` for one partition.
    pub fn compute_event_impact(
        table: &SalesTable,
        selector: &RegionSelector,
        event_date: NaiveDate,
    ) -> EventImpact {
        let (before, after): (Vec<_>, Vec<_>) = table
            .daily_totals(selector)
            .into_iter()
            .partition(|t| t.date < event_date);

        let before: Vec<Decimal> = before.into_iter().map(|t| t.sales).collect();
        let after: Vec<Decimal> = after.into_iter().map(|t| t.sales).collect();

        let before_stats = Self::compute_period_stats(&before);
        let after_stats = Self::compute_period_stats(&after);

        let mean_change_pct = (before_stats.days > 0
            && after_stats.days > 0
            && before_stats.mean != 0.0)
            .then(|| (after_stats.mean - before_stats.mean) / before_stats.mean * 100.0);

        let to_f64 = |v: &[Decimal]| -> Vec<f64> { v.iter().filter_map(|d| d.to_f64()).collect() };
        let p_value = Self::welch_p_value(&to_f64(&after), &to_f64(&before));

        EventImpact {
            region: selector.label().to_string(),
            event_date,
            before: before_stats,
            after: after_stats,
            mean_change_pct,
            p_value,
            is_significant: p_value.is_some_and(|p| p <= SIGNIFICANCE_THRESHOLD),
        }
    }

    /// Event impact for `all` and every region, computed in parallel.
    pub fn compute_all_regions(
        table: &SalesTable,
        event_date: NaiveDate,
    ) -> BTreeMap<String, EventImpact> {
        let mut selectors = vec![RegionSelector::All];
        selectors.extend(table.regions().into_iter().map(RegionSelector::Region));

        selectors
            .par_iter()
            .map(|selector| {
                let impact = Self::compute_event_impact(table, selector, event_date);
                (selector.label().to_string(), impact)
            })
            .collect()
    }
}
