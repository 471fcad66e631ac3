use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use configuration::DataSourceSettings;
use core_types::DailyBar;
use reqwest::Url;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::parse_chart;

/// The abstract interface for a daily price provider.
///
/// This trait is the contract the analysis service uses, allowing the
/// underlying implementation (live, cached or stubbed) to be swapped out.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches daily bars with `start <= date <= end`, in date order.
    ///
    /// An unknown symbol is an empty list, not an error.
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ApiError>;
}

/// A concrete implementation of the `DataSource` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: Url,
    auto_adjust: bool,
}

impl YahooClient {
    pub fn new(settings: &DataSourceSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            ApiError::InvalidData(format!("bad base url '{}': {}", settings.base_url, e))
        })?;

        Ok(Self {
            client,
            base_url,
            auto_adjust: settings.auto_adjust,
        })
    }

    /// `{base}/v8/finance/chart/{ticker}`, with the ticker percent-encoded as one segment.
    fn chart_url(&self, ticker: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidData("base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart"])
            .push(ticker);
        Ok(url)
    }
}

/// Unix seconds at UTC midnight of `date`.
fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl DataSource for YahooClient {
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ApiError> {
        // period2 is exclusive on the provider side.
        let until = end.checked_add_days(Days::new(1)).unwrap_or(end);
        let url = self.chart_url(ticker)?;

        tracing::debug!(ticker, %start, %end, "Requesting daily chart.");
        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", unix_midnight(start).to_string()),
                ("period2", unix_midnight(until).to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // Unknown symbols come back as 404 with a structured body, so the body
        // is parsed before the status is judged.
        let bars = match parse_chart(&text, self.auto_adjust) {
            Ok(bars) => bars,
            Err(ApiError::Deserialization(_)) if !status.is_success() => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: text.chars().take(200).collect(),
                });
            }
            Err(e) => return Err(e),
        };

        let bars: Vec<DailyBar> = bars
            .into_iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .collect();
        tracing::info!(ticker, bars = bars.len(), "Fetched daily bars from provider.");
        Ok(bars)
    }
}
