use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The complete, sanitized result of analysing one instrument.
///
/// This struct is the final output of the `ReportAssembler` and the body
/// returned by the HTTP API. Every numeric field has already been through the
/// sanitizer: it is either a finite 2-decimal number or `None` (`null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub ticker: String,
    /// The requested horizon, e.g. `2y` or `2023-01-02..2024-01-02`.
    pub period: String,

    // I. Return and risk, in percent where the name says so
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total_return_pct: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cagr_pct: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub volatility_pct: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sharpe_ratio: Option<Decimal>, // None when volatility is zero or undefined
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max_drawdown_pct: Option<Decimal>,

    // II. Narrative
    pub analysis: String,

    // III. Chart data, one row per trading day in date order
    pub history: Vec<HistoryRow>,

    /// Stages that failed without sinking the whole report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// One sanitized trading day of prices and indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub open: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub high: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub low: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub close: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub volume: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ma5: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ma20: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ma60: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rsi14: Option<Decimal>,
}
