use crate::error::AppError;
use analytics::{AnalyticsError, PerformanceReport, ReportAssembler};
use api_client::DataSource;
use chrono::NaiveDate;
use configuration::AnalysisSettings;
use core_types::{AnalysisRequest, PriceSeries};

/// Runs one analysis end to end: validate, fetch, assemble.
///
/// `today` anchors named periods, so callers decide what "now" means.
pub async fn analyze(
    source: &dyn DataSource,
    request: &AnalysisRequest,
    defaults: &AnalysisSettings,
    today: NaiveDate,
) -> Result<PerformanceReport, AppError> {
    let ticker = request.symbol()?.to_ascii_uppercase();
    let horizon = request.horizon(defaults.default_period)?;
    let risk_free_rate = request.risk_free_rate(defaults.risk_free_rate)?;
    let (start, end) = horizon.date_range(today);

    tracing::info!(%ticker, %horizon, %start, %end, "Starting analysis.");

    let bars = source
        .fetch_daily_bars(&ticker, start, end)
        .await
        .map_err(|e| AnalyticsError::UpstreamFailure(e.to_string()))?;
    let series = PriceSeries::new(bars).map_err(|e| {
        AnalyticsError::UpstreamFailure(format!("provider returned an unusable series: {}", e))
    })?;

    let report = ReportAssembler::new(risk_free_rate).assemble(&ticker, &horizon.label(), &series)?;
    Ok(report)
}
