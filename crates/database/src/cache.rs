use crate::DbError;
use api_client::DataSource;
use api_client::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::DailyBar;
use std::time::Duration;

/// Persistence behind the read-through cache.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// The stored bars for exactly this range, if it was fetched within `max_age`.
    async fn fresh_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        max_age: Duration,
    ) -> Result<Option<Vec<DailyBar>>, DbError>;

    async fn store_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        bars: &[DailyBar],
    ) -> Result<(), DbError>;
}

/// A `DataSource` that serves recent downloads from a store before asking upstream.
///
/// Store failures never fail a request: they are logged and the upstream
/// source is used instead. Empty results are not stored, so an unknown
/// symbol is asked about again next time.
pub struct CachedDataSource<S, C> {
    upstream: S,
    store: C,
    ttl: Duration,
}

impl<S, C> CachedDataSource<S, C>
where
    S: DataSource,
    C: SeriesStore,
{
    pub fn new(upstream: S, store: C, ttl: Duration) -> Self {
        Self { upstream, store, ttl }
    }
}

#[async_trait]
impl<S, C> DataSource for CachedDataSource<S, C>
where
    S: DataSource,
    C: SeriesStore,
{
    async fn fetch_daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ApiError> {
        match self.store.fresh_bars(ticker, start, end, self.ttl).await {
            Ok(Some(bars)) if !bars.is_empty() => {
                tracing::debug!(ticker, bars = bars.len(), "Serving daily bars from cache.");
                return Ok(bars);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(ticker, error = %e, "Cache lookup failed; going upstream."),
        }

        let bars = self.upstream.fetch_daily_bars(ticker, start, end).await?;

        if !bars.is_empty() {
            if let Err(e) = self.store.store_bars(ticker, start, end, &bars).await {
                tracing::warn!(ticker, error = %e, "Failed to cache daily bars.");
            }
        }
        Ok(bars)
    }
}
