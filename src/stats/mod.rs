//! Stats module - Event impact statistics

mod calculator;

pub use calculator::{EventImpact, PeriodStats, StatsCalculator, SIGNIFICANCE_THRESHOLD};
