//! Record Normalizer Module
//! Filters raw rows to the target product and coerces price, quantity and date.
//!
//! Normalization is a pure function of its input: rows that fail a check are
//! dropped and counted, never logged or returned as errors.

use crate::data::{CleanRecord, RawRecord};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Date formats tried in order when none are configured.
pub const DEFAULT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const TIME_SUFFIXES: [&str; 2] = [" %H:%M:%S", "T%H:%M:%S"];

/// How currency text is turned into a number before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum PriceRule {
    /// Keep digits, a single decimal point and a leading minus.
    StripNonNumeric,
    /// Remove only the listed symbols, then parse what is left.
    StripSymbols { symbols: Vec<char> },
}

impl Default for PriceRule {
    fn default() -> Self {
        PriceRule::StripNonNumeric
    }
}

impl PriceRule {
    /// Parse a price cell. Returns `None` for unparseable or negative values.
    pub fn parse(&self, raw: &str) -> Option<Decimal> {
        let cleaned = match self {
            PriceRule::StripNonNumeric => strip_non_numeric(raw)?,
            PriceRule::StripSymbols { symbols } => raw
                .trim()
                .chars()
                .filter(|c| !symbols.contains(c))
                .collect(),
        };

        let price = Decimal::from_str(cleaned.trim()).ok()?;
        if price.is_sign_negative() && !price.is_zero() {
            return None;
        }
        Some(price)
    }
}

/// Keeps digits, one `.` and a minus that precedes every digit.
/// Any other minus makes the value unparseable.
fn strip_non_numeric(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut seen_point = false;
    let mut seen_digit = false;

    for c in raw.chars() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                out.push(c);
            }
            '.' if seen_point => return None,
            '.' => {
                seen_point = true;
                out.push(c);
            }
            '-' if out.is_empty() => out.push(c),
            '-' => return None,
            _ => {}
        }
    }

    seen_digit.then_some(out)
}

/// Rules applied to every raw row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeRules {
    target_product: String,
    pub price_rule: PriceRule,
    pub date_formats: Vec<String>,
}

impl NormalizeRules {
    pub fn new(target_product: &str) -> Self {
        Self {
            target_product: normalize_product(target_product),
            price_rule: PriceRule::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn with_price_rule(mut self, rule: PriceRule) -> Self {
        self.price_rule = rule;
        self
    }

    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        if !formats.is_empty() {
            self.date_formats = formats;
        }
        self
    }

    pub fn target_product(&self) -> &str {
        &self.target_product
    }

    pub fn matches_product(&self, product: &str) -> bool {
        normalize_product(product) == self.target_product
    }

    /// Parse a quantity cell. Integral decimals ("10.0") are accepted.
    pub fn parse_quantity(raw: &str) -> Option<u64> {
        let raw = raw.trim();
        if let Ok(q) = raw.parse::<u64>() {
            return Some(q);
        }
        let value = Decimal::from_str(raw).ok()?;
        if value.is_sign_negative() || !value.fract().is_zero() {
            return None;
        }
        value.to_u64()
    }

    /// Parse a date cell against the configured formats.
    /// A trailing time of day is accepted and discarded.
    pub fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        self.date_formats.iter().find_map(|format| {
            NaiveDate::parse_from_str(raw, format).ok().or_else(|| {
                TIME_SUFFIXES.iter().find_map(|time| {
                    NaiveDateTime::parse_from_str(raw, &format!("{format}{time}"))
                        .ok()
                        .map(|dt| dt.date())
                })
            })
        })
    }
}

fn normalize_product(product: &str) -> String {
    product.trim().to_lowercase()
}

/// Why a raw row did not make it into the clean set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    ProductMismatch,
    InvalidPrice,
    InvalidQuantity,
    InvalidDate,
    /// `quantity * price` does not fit in a `Decimal`.
    SalesOverflow,
}

/// Dropped row counts, one bucket per first failing check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub product_mismatch: usize,
    pub invalid_price: usize,
    pub invalid_quantity: usize,
    pub invalid_date: usize,
    pub sales_overflow: usize,
}

impl DropCounts {
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::ProductMismatch => self.product_mismatch += 1,
            DropReason::InvalidPrice => self.invalid_price += 1,
            DropReason::InvalidQuantity => self.invalid_quantity += 1,
            DropReason::InvalidDate => self.invalid_date += 1,
            DropReason::SalesOverflow => self.sales_overflow += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.product_mismatch + self.invalid()
    }

    /// Rows dropped for bad data, excluding out-of-scope products.
    pub fn invalid(&self) -> usize {
        self.invalid_price + self.invalid_quantity + self.invalid_date + self.sales_overflow
    }
}

/// Normalizer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub records: Vec<CleanRecord>,
    pub drops: DropCounts,
}

/// Coerce one row, or report the first check it fails.
pub fn normalize_record(raw: &RawRecord, rules: &NormalizeRules) -> Result<CleanRecord, DropReason> {
    if !rules.matches_product(&raw.product) {
        return Err(DropReason::ProductMismatch);
    }
    let price = rules
        .price_rule
        .parse(&raw.price)
        .ok_or(DropReason::InvalidPrice)?;
    let quantity =
        NormalizeRules::parse_quantity(&raw.quantity).ok_or(DropReason::InvalidQuantity)?;
    let date = rules.parse_date(&raw.date).ok_or(DropReason::InvalidDate)?;

    let clean = CleanRecord {
        price,
        quantity,
        date,
        region: raw.region.trim().to_string(),
    };
    match clean.sales() {
        Some(_) => Ok(clean),
        None => Err(DropReason::SalesOverflow),
    }
}

/// Normalize a batch of raw rows, preserving their order.
pub fn normalize(raws: &[RawRecord], rules: &NormalizeRules) -> Normalized {
    let mut out = Normalized::default();
    for raw in raws {
        match normalize_record(raw, rules) {
            Ok(record) => out.records.push(record),
            Err(reason) => out.drops.record(reason),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(product: &str, price: &str, quantity: &str, date: &str, region: &str) -> RawRecord {
        RawRecord {
            product: product.into(),
            price: price.into(),
            quantity: quantity.into(),
            date: date.into(),
            region: region.into(),
        }
    }

    fn rules() -> NormalizeRules {
        NormalizeRules::new("pink morsel")
    }

    #[test]
    fn strips_currency_and_thousands_separators() {
        let rule = PriceRule::StripNonNumeric;
        assert_eq!(rule.parse("$3.00"), Some(dec("3.00")));
        assert_eq!(rule.parse("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(rule.parse(" €0.5 "), Some(dec("0.5")));
        assert_eq!(rule.parse("abc"), None);
        assert_eq!(rule.parse("1.2.3"), None);
        assert_eq!(rule.parse("-$2.00"), None);
        assert_eq!(rule.parse("-0"), Some(dec("0")));
    }

    #[test]
    fn strip_symbols_only_removes_listed_symbols() {
        let rule = PriceRule::StripSymbols { symbols: vec!['$'] };
        assert_eq!(rule.parse("$3.00"), Some(dec("3.00")));
        assert_eq!(rule.parse("$1,234.56"), None);
        assert_eq!(rule.parse("€3.00"), None);
    }

    #[test]
    fn quantity_must_be_a_non_negative_integer() {
        assert_eq!(NormalizeRules::parse_quantity("10"), Some(10));
        assert_eq!(NormalizeRules::parse_quantity(" 7 "), Some(7));
        assert_eq!(NormalizeRules::parse_quantity("10.0"), Some(10));
        assert_eq!(NormalizeRules::parse_quantity("2.5"), None);
        assert_eq!(NormalizeRules::parse_quantity("-1"), None);
        assert_eq!(NormalizeRules::parse_quantity("ten"), None);
        assert_eq!(NormalizeRules::parse_quantity(""), None);
    }

    #[test]
    fn dates_accept_configured_formats_and_trailing_time() {
        let rules = rules();
        let expected = NaiveDate::from_ymd_opt(2021, 1, 10);
        assert_eq!(rules.parse_date("2021-01-10"), expected);
        assert_eq!(rules.parse_date("2021/01/10"), expected);
        assert_eq!(rules.parse_date("2021-01-10 00:00:00"), expected);
        assert_eq!(rules.parse_date("2021-01-10T08:30:00"), expected);
        assert_eq!(rules.parse_date("2021-02-30"), None);
        assert_eq!(rules.parse_date("yesterday"), None);

        let custom = rules.with_date_formats(vec!["%d.%m.%Y".to_string()]);
        assert_eq!(custom.parse_date("10.01.2021"), expected);
        assert_eq!(custom.parse_date("2021-01-10"), None);
    }

    #[test]
    fn product_match_is_trimmed_and_case_insensitive() {
        let rules = NormalizeRules::new(" Pink Morsel ");
        assert_eq!(rules.target_product(), "pink morsel");
        assert!(rules.matches_product("PINK MORSEL"));
        assert!(rules.matches_product("  pink morsel"));
        assert!(!rules.matches_product("pink morsels"));
    }

    #[test]
    fn region_is_trimmed_but_case_preserved() {
        let clean =
            normalize_record(&raw("pink morsel", "$1.00", "1", "2021-01-01", "  North "), &rules())
                .unwrap();
        assert_eq!(clean.region, "North");
    }

    #[test]
    fn drops_are_counted_by_first_failing_check() {
        let rows = vec![
            raw("Pink Morsel", "$3.00", "10", "2021-01-10", "north"),
            raw("Gummy Bear", "$2.00", "5", "2021-01-10", "north"),
            raw("pink morsel", "abc", "5", "2021-01-10", "north"),
            raw("pink morsel", "abc", "x", "bad", "north"),
            raw("pink morsel", "$1.00", "-3", "2021-01-10", "south"),
            raw("pink morsel", "$1.00", "3", "not a date", "south"),
        ];

        let out = normalize(&rows, &rules());
        assert_eq!(out.records.len(), 1);
        assert_eq!(
            out.drops,
            DropCounts {
                product_mismatch: 1,
                invalid_price: 2,
                invalid_quantity: 1,
                invalid_date: 1,
                sales_overflow: 0,
            }
        );
        assert_eq!(out.drops.total(), 5);
        assert_eq!(out.drops.invalid(), 4);
    }

    #[test]
    fn sales_that_overflow_decimal_are_dropped() {
        let max = Decimal::MAX.to_string();
        let rows = vec![
            raw("pink morsel", &format!("${max}"), "2", "2021-01-10", "north"),
            raw("pink morsel", &max, "1", "2021-01-10", "north"),
        ];

        let out = normalize(&rows, &rules());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].sales(), Some(Decimal::MAX));
        assert_eq!(out.drops.sales_overflow, 1);
        assert_eq!(out.drops.invalid(), 1);
    }

    #[test]
    fn interior_minus_is_not_a_price() {
        let rule = PriceRule::StripNonNumeric;
        assert_eq!(rule.parse("1-2"), None);
        assert_eq!(rule.parse("$3.00-"), None);
        assert_eq!(rule.parse("2021-01-10"), None);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let out = normalize(&[], &rules());
        assert!(out.records.is_empty());
        assert_eq!(out.drops.total(), 0);
    }
}
