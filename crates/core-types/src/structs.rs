use crate::enums::{Horizon, Period};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MAX_TICKER_LEN: usize = 32;

/// Letters, digits and the punctuation used by exchange symbols
/// (`BRK-B`, `RDS.A`, `^GSPC`, `EURUSD=X`).
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')
}

/// One trading day of OHLCV data.
///
/// Only `close` is mandatory. Providers occasionally omit the other fields for
/// a day, and that absence is carried through to the report as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl DailyBar {
    /// A bar where every price field equals `close`. Handy for synthetic series.
    pub fn flat(date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            date,
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close,
            volume: Some(volume),
        }
    }
}

/// A validated, immutable daily price history for one instrument.
///
/// Dates are strictly increasing and every close is finite and positive.
/// An empty series is allowed: it is how "the provider had nothing" travels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<DailyBar>) -> Result<Self, CoreError> {
        for bar in &bars {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(CoreError::InvalidClose(bar.date));
            }
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::UnorderedSeries(pair[1].date));
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&DailyBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

/// The inbound request for an analysis, as received over HTTP or built by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub risk_free_rate: Option<f64>,
}

impl AnalysisRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            period: None,
            start: None,
            end: None,
            risk_free_rate: None,
        }
    }

    /// Returns the trimmed ticker, rejecting empty or malformed symbols.
    pub fn symbol(&self) -> Result<&str, CoreError> {
        let ticker = self.ticker.trim();
        if ticker.is_empty() {
            return Err(CoreError::InvalidInput(
                "ticker".to_string(),
                "must not be empty".to_string(),
            ));
        }
        if ticker.len() > MAX_TICKER_LEN || !ticker.chars().all(is_symbol_char) {
            return Err(CoreError::InvalidInput(
                "ticker".to_string(),
                format!("'{}' is not a valid symbol", ticker),
            ));
        }
        Ok(ticker)
    }

    /// Works out which window was asked for. Explicit dates and a named period
    /// are mutually exclusive; with neither, `default_period` applies.
    pub fn horizon(&self, default_period: Period) -> Result<Horizon, CoreError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                if self.period.is_some() {
                    return Err(CoreError::InvalidInput(
                        "period".to_string(),
                        "give either a period or start/end dates, not both".to_string(),
                    ));
                }
                Horizon::range(start, end)
            }
            (None, None) => Ok(Horizon::Named(self.period.unwrap_or(default_period))),
            _ => Err(CoreError::InvalidInput(
                "start/end".to_string(),
                "start and end must be given together".to_string(),
            )),
        }
    }

    /// The risk-free rate to use, falling back to `default_rate`.
    pub fn risk_free_rate(&self, default_rate: f64) -> Result<f64, CoreError> {
        let rate = self.risk_free_rate.unwrap_or(default_rate);
        if !rate.is_finite() {
            return Err(CoreError::InvalidInput(
                "risk_free_rate".to_string(),
                "must be a finite number".to_string(),
            ));
        }
        Ok(rate)
    }
}
