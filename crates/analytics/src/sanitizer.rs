//! Numeric sanitation for everything that leaves the analytics boundary.
//!
//! Every number in a report passes through here. The result is either a
//! finite value rounded to two decimals or `None`, which serializes as JSON
//! `null`. NaN and infinities therefore never reach a serializer.

use crate::report::HistoryRow;
use chrono::NaiveDate;
use rust_decimal::prelude::*;

/// Decimal places kept in sanitized output.
pub const PRECISION: u32 = 2;

/// Rounds a finite number to two decimals; non-finite input becomes `None`.
///
/// Values too large for a `Decimal` (beyond roughly 7.9e28) are also treated
/// as missing.
pub fn normalize_number(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let rounded = Decimal::from_f64(value)?.round_dp(PRECISION);
    // Fold "-0.00" into a plain zero so identical inputs print identically.
    if rounded.is_zero() {
        Some(Decimal::ZERO)
    } else {
        Some(rounded)
    }
}

/// Like [`normalize_number`], with `None` standing for an undefined value.
pub fn normalize_optional(value: Option<f64>) -> Option<Decimal> {
    value.and_then(normalize_number)
}

/// Scales a ratio to a percentage before normalizing it.
pub fn normalize_percentage(ratio: Option<f64>) -> Option<Decimal> {
    normalize_optional(ratio.map(|r| r * 100.0))
}

/// One unsanitized row of the price/indicator history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub rsi14: Option<f64>,
}

/// Sanitizes each field of each record. Count and order are preserved.
pub fn normalize_series(records: &[HistoryRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|r| HistoryRow {
            date: r.date,
            open: normalize_optional(r.open),
            high: normalize_optional(r.high),
            low: normalize_optional(r.low),
            close: normalize_number(r.close),
            volume: normalize_optional(r.volume),
            ma5: normalize_optional(r.ma5),
            ma20: normalize_optional(r.ma20),
            ma60: normalize_optional(r.ma60),
            rsi14: normalize_optional(r.rsi14),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(normalize_number(41.421356), Some(dec!(41.42)));
        assert_eq!(normalize_number(-12.3456), Some(dec!(-12.35)));
        assert_eq!(normalize_number(7.0), Some(dec!(7)));
    }

    #[test]
    fn non_finite_values_are_missing() {
        assert_eq!(normalize_number(f64::NAN), None);
        assert_eq!(normalize_number(f64::INFINITY), None);
        assert_eq!(normalize_number(f64::NEG_INFINITY), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn never_yields_a_non_finite_number() {
        let inputs = [
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
            -0.0,
            1e20,
            -1e-20,
            123.456,
        ];
        for input in inputs {
            if let Some(value) = normalize_number(input) {
                let back = value.to_f64().unwrap();
                assert!(back.is_finite(), "{} normalized to {}", input, back);
            }
        }
    }

    #[test]
    fn negative_zero_is_folded() {
        let value = normalize_number(-0.001).unwrap();
        assert!(value.is_zero());
        assert!(!value.is_sign_negative());
    }

    #[test]
    fn percentages_are_scaled_before_rounding() {
        assert_eq!(normalize_percentage(Some(0.123456)), Some(dec!(12.35)));
        assert_eq!(normalize_percentage(None), None);
    }

    #[test]
    fn series_normalization_preserves_count_and_order() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let records = vec![
            HistoryRecord {
                date: day(1),
                open: Some(1.005),
                high: None,
                low: Some(f64::NAN),
                close: 2.0,
                volume: Some(1_500.0),
                ma5: None,
                ma20: None,
                ma60: None,
                rsi14: None,
            },
            HistoryRecord {
                date: day(4),
                open: Some(3.0),
                high: Some(3.5),
                low: Some(2.5),
                close: 3.3333,
                volume: None,
                ma5: Some(2.66666),
                ma20: None,
                ma60: None,
                rsi14: Some(100.0),
            },
        ];

        let rows = normalize_series(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, day(1));
        assert_eq!(rows[1].date, day(4));
        assert_eq!(rows[0].low, None);
        assert_eq!(rows[0].high, None);
        assert_eq!(rows[0].volume, Some(dec!(1500)));
        assert_eq!(rows[1].close, Some(dec!(3.33)));
        assert_eq!(rows[1].ma5, Some(dec!(2.67)));
        assert_eq!(rows[1].rsi14, Some(dec!(100)));
    }
}
