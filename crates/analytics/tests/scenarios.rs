//! End-to-end behaviour of the report pipeline on synthetic series.

use analytics::narrative::{INSUFFICIENT_DATA, Trend};
use analytics::{AnalyticsError, MetricsEngine, ReportAssembler};
use chrono::{Duration, NaiveDate};
use core_types::{DailyBar, PriceSeries};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

fn daily_series(start: NaiveDate, closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| DailyBar::flat(start + Duration::days(i as i64), close, 1_000_000))
        .collect();
    PriceSeries::new(bars).expect("synthetic series is valid")
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
}

#[test]
fn constant_price_year_reports_flat_kpis_and_consolidation() {
    let series = daily_series(jan(3), &[100.0; 252]);
    let report = ReportAssembler::default().assemble("FLAT", "1y", &series).unwrap();

    assert_eq!(report.cagr_pct, Some(Decimal::ZERO));
    assert_eq!(report.volatility_pct, Some(Decimal::ZERO));
    assert_eq!(report.sharpe_ratio, None);
    assert_eq!(report.max_drawdown_pct, Some(Decimal::ZERO));
    assert_eq!(
        report.analysis,
        format!(
            "{} Neutral momentum (RSI=50.00): sentiment is steady.",
            Trend::Consolidation.phrase()
        )
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["sharpe_ratio"], Value::Null);
    assert_eq!(json["cagr_pct"], json!(0.0));
    assert_eq!(json["history"].as_array().unwrap().len(), 252);
}

#[test]
fn ten_day_series_computes_kpis_without_narrative() {
    let closes: Vec<f64> = (0..10).map(|i| 20.0 + i as f64 * 0.5).collect();
    let report = ReportAssembler::default()
        .assemble("SHORT", "1y", &daily_series(jan(3), &closes))
        .unwrap();

    assert_eq!(report.analysis, INSUFFICIENT_DATA);
    assert!(report.cagr_pct.is_some());
    assert!(report.volatility_pct.is_some());
    assert!(report.total_return_pct.is_some());
    assert_eq!(report.max_drawdown_pct, Some(Decimal::ZERO));
}

#[test]
fn doubling_over_two_years_compounds_to_about_41_percent() {
    // 731 calendar days from 2022-01-01 to 2024-01-01, rising linearly 100 -> 200.
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let points = 731;
    let closes: Vec<f64> = (0..points)
        .map(|i| 100.0 + 100.0 * i as f64 / (points - 1) as f64)
        .collect();
    let report = ReportAssembler::default()
        .assemble("DBL", "2y", &daily_series(start, &closes))
        .unwrap();

    let cagr = report.cagr_pct.unwrap();
    // 730 days is 1.9986 years, which lands a few hundredths above 41.42.
    assert!((cagr - dec!(41.42)).abs() < dec!(0.05), "cagr_pct = {}", cagr);
    assert_eq!(report.total_return_pct, Some(dec!(100)));
    assert_eq!(report.max_drawdown_pct, Some(Decimal::ZERO));
}

#[test]
fn empty_provider_result_yields_no_data() {
    let result = ReportAssembler::default().assemble("NONE", "2y", &PriceSeries::empty());
    assert_eq!(result, Err(AnalyticsError::NoData));
}

#[test]
fn identical_input_serializes_identically() {
    let closes: Vec<f64> = (0..300)
        .map(|i| 50.0 + 10.0 * ((i as f64) / 17.0).sin() + i as f64 * 0.05)
        .collect();
    let series = daily_series(jan(3), &closes);
    let assembler = ReportAssembler::new(0.03);

    let first = serde_json::to_string(&assembler.assemble("WAVE", "2y", &series).unwrap()).unwrap();
    let second = serde_json::to_string(&assembler.assemble("WAVE", "2y", &series).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn rsi_is_bounded_on_a_volatile_series() {
    let closes: Vec<f64> = (0..400)
        .map(|i| 80.0 + 25.0 * ((i as f64) * 0.9).cos() * ((i as f64) * 0.05).sin() + 30.0)
        .collect();
    let indicators = MetricsEngine::new().compute_indicators(&daily_series(jan(3), &closes));
    for value in indicators.rsi14.iter().flatten() {
        assert!((0.0..=100.0).contains(value));
    }
}

#[test]
fn falling_market_reads_bearish_and_oversold() {
    let closes: Vec<f64> = (0..90).map(|i| 200.0 - i as f64).collect();
    let report = ReportAssembler::default()
        .assemble("DOWN", "1y", &daily_series(jan(3), &closes))
        .unwrap();

    assert!(report.analysis.starts_with(Trend::Bearish.phrase()));
    assert!(report.analysis.contains("Oversold (RSI=0.00)"));
    assert!(report.max_drawdown_pct.unwrap() < Decimal::ZERO);
}
