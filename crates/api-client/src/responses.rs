use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use core_types::DailyBar;
use serde::Deserialize;

/// Provider error code for an unknown or delisted symbol.
pub const NOT_FOUND_CODE: &str = "Not Found";

// Yahoo wraps everything in `chart`; either `result` or `error` is populated.

/// The body of `GET /v8/finance/chart/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Missing entirely when the requested range has no trading days.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    /// Seconds east of UTC for the listing exchange.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
    #[serde(default)]
    pub adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartAdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Parses a chart payload into ordered daily bars.
///
/// An unknown symbol yields an empty list rather than an error. Rows with no
/// close are skipped. With `auto_adjust`, the close is replaced by the
/// adjusted close and open/high/low are scaled by the same factor.
pub fn parse_chart(body: &str, auto_adjust: bool) -> Result<Vec<DailyBar>, ApiError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::Deserialization(format!("failed to parse chart: {}", e)))?;

    if let Some(error) = response.chart.error {
        if error.code == NOT_FOUND_CODE {
            tracing::debug!(description = %error.description, "Provider does not know this symbol.");
            return Ok(Vec::new());
        }
        return Err(ApiError::Provider {
            code: error.code,
            description: error.description,
        });
    }

    let result = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(Vec::new()),
    };

    bars_from_result(&result, auto_adjust)
}

fn bars_from_result(result: &ChartResult, auto_adjust: bool) -> Result<Vec<DailyBar>, ApiError> {
    let empty = ChartQuote::default();
    let quote = result.indicators.quote.first().unwrap_or(&empty);
    let adjusted = result.indicators.adjclose.first().map(|a| a.adjclose.as_slice());

    let mut bars: Vec<DailyBar> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(raw_close) = value_at(&quote.close, i) else {
            continue;
        };
        let date = trading_date(ts, result.meta.gmtoffset)?;

        let factor = match adjusted.and_then(|column| value_at(column, i)) {
            Some(adj) if auto_adjust && raw_close != 0.0 => Some((adj, adj / raw_close)),
            _ => None,
        };
        let (close, scale) = match factor {
            Some((adj, ratio)) => (adj, ratio),
            None => (raw_close, 1.0),
        };

        let bar = DailyBar {
            date,
            open: value_at(&quote.open, i).map(|v| v * scale),
            high: value_at(&quote.high, i).map(|v| v * scale),
            low: value_at(&quote.low, i).map(|v| v * scale),
            close,
            volume: quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok()),
        };

        // The provider occasionally repeats the current session as an extra row.
        match bars.last().map(|last| last.date) {
            Some(previous) if previous == bar.date => {
                bars.pop();
                bars.push(bar);
            }
            Some(previous) if previous > bar.date => {
                tracing::warn!(date = %bar.date, "Dropping out-of-order row from provider.");
            }
            _ => bars.push(bar),
        }
    }

    Ok(bars)
}

fn value_at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Converts a Unix timestamp to the exchange-local calendar date.
fn trading_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate, ApiError> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", timestamp)))
}
