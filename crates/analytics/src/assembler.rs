use crate::engine::{DEFAULT_RISK_FREE_RATE, IndicatorSet, MetricsEngine};
use crate::error::AnalyticsError;
use crate::narrative::{NarrativeGenerator, TrendInputs};
use crate::report::PerformanceReport;
use crate::sanitizer::{
    HistoryRecord, normalize_optional, normalize_percentage, normalize_series,
};
use core_types::PriceSeries;

/// `analysis` text used when the narrative stage itself failed.
pub const NARRATIVE_UNAVAILABLE: &str = "narrative unavailable";

/// Runs the metrics, narrative and sanitizer stages and packages the result.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    engine: MetricsEngine,
    narrator: NarrativeGenerator,
    risk_free_rate: f64,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE)
    }
}

impl ReportAssembler {
    pub fn new(risk_free_rate: f64) -> Self {
        Self {
            engine: MetricsEngine::new(),
            narrator: NarrativeGenerator::new(),
            risk_free_rate,
        }
    }

    /// Builds the report for `series`.
    ///
    /// An empty series short-circuits with `NoData`, and a single point fails
    /// with `InsufficientHistory`. A computation failure in either the KPI or
    /// the narrative stage does not block the other: the affected fields are
    /// left empty and the failure is listed in `diagnostics`.
    pub fn assemble(
        &self,
        ticker: &str,
        horizon: &str,
        series: &PriceSeries,
    ) -> Result<PerformanceReport, AnalyticsError> {
        if series.is_empty() {
            tracing::warn!(ticker, horizon, "No price data to analyse.");
            return Err(AnalyticsError::NoData);
        }

        let indicators = self.engine.compute_indicators(series);
        let mut diagnostics = Vec::new();

        let kpis = match self.engine.compute_kpis(series, self.risk_free_rate) {
            Ok(kpis) => Some(kpis),
            Err(AnalyticsError::Computation(message)) => {
                tracing::warn!(ticker, %message, "KPI computation failed; continuing without KPIs.");
                diagnostics.push(format!("kpis: {}", message));
                None
            }
            Err(e) => return Err(e),
        };

        let narrative = TrendInputs::latest(series, &indicators)
            .and_then(|inputs| self.narrator.generate(&inputs));
        let analysis = match narrative {
            Ok(narrative) => narrative.to_string(),
            Err(AnalyticsError::Computation(message)) => {
                tracing::warn!(ticker, %message, "Narrative generation failed; continuing without it.");
                diagnostics.push(format!("narrative: {}", message));
                NARRATIVE_UNAVAILABLE.to_string()
            }
            Err(e) => return Err(e),
        };

        let history = normalize_series(&history_records(series, &indicators));

        tracing::info!(
            ticker,
            horizon,
            points = series.len(),
            degraded = !diagnostics.is_empty(),
            "Assembled performance report."
        );

        Ok(PerformanceReport {
            ticker: ticker.to_string(),
            period: horizon.to_string(),
            total_return_pct: normalize_percentage(kpis.map(|k| k.total_return)),
            cagr_pct: normalize_percentage(kpis.map(|k| k.cagr)),
            volatility_pct: normalize_percentage(kpis.and_then(|k| k.volatility)),
            sharpe_ratio: normalize_optional(kpis.and_then(|k| k.sharpe_ratio)),
            max_drawdown_pct: normalize_percentage(kpis.map(|k| k.max_drawdown)),
            analysis,
            history,
            diagnostics,
        })
    }
}

/// Zips the bars with their indicator values, one record per date.
fn history_records(series: &PriceSeries, indicators: &IndicatorSet) -> Vec<HistoryRecord> {
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| HistoryRecord {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume.map(|v| v as f64),
            ma5: indicators.sma5[i],
            ma20: indicators.sma20[i],
            ma60: indicators.sma60[i],
            rsi14: indicators.rsi14[i],
        })
        .collect()
}
