use crate::DbError;
use crate::cache::SeriesStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::DailyBar;
use sqlx::Row;
use sqlx::postgres::PgPool;
use std::time::Duration;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new repository with a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns when the range was last downloaded, if ever.
    pub async fn last_fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<DateTime<Utc>>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT fetched_at
            FROM series_fetches
            WHERE ticker = $1 AND start_date = $2 AND end_date = $3
            "#,
        )
        .bind(ticker)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("fetched_at")))
    }

    /// Fetches stored bars with `start <= date <= end`, ordered by date.
    pub async fn load_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT date, open, high, low, close, volume
            FROM price_bars
            WHERE ticker = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC
            "#,
        )
        .bind(ticker)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let volume: Option<i64> = row.get("volume");
                let volume = volume
                    .map(|v| {
                        u64::try_from(v)
                            .map_err(|_| DbError::InvalidData(format!("negative volume {}", v)))
                    })
                    .transpose()?;
                Ok(DailyBar {
                    date: row.get("date"),
                    open: row.get("open"),
                    high: row.get("high"),
                    low: row.get("low"),
                    close: row.get("close"),
                    volume,
                })
            })
            .collect()
    }

    /// Stores the bars and marks the range as fetched, in one transaction.
    ///
    /// Bars are upserted, so a later download of an overlapping range
    /// replaces earlier values for the same dates. Every other recorded range
    /// that overlaps this one loses its fetch record, since part of its bars
    /// now come from this download; it is fetched again on next use.
    pub async fn save_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        bars: &[DailyBar],
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for bar in bars {
            let volume = bar
                .volume
                .map(|v| {
                    i64::try_from(v)
                        .map_err(|_| DbError::InvalidData(format!("volume {} overflows BIGINT", v)))
                })
                .transpose()?;
            sqlx::query(
                r#"
                INSERT INTO price_bars (ticker, date, open, high, low, close, volume)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (ticker, date) DO UPDATE
                SET open = EXCLUDED.open, high = EXCLUDED.high, low = EXCLUDED.low,
                    close = EXCLUDED.close, volume = EXCLUDED.volume
                "#,
            )
            .bind(ticker)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(volume)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            DELETE FROM series_fetches
            WHERE ticker = $1 AND start_date <= $3 AND end_date >= $2
              AND NOT (start_date = $2 AND end_date = $3)
            "#,
        )
        .bind(ticker)
        .bind(start)
        .bind(end)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO series_fetches (ticker, start_date, end_date, fetched_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (ticker, start_date, end_date) DO UPDATE SET fetched_at = NOW()
            "#,
        )
        .bind(ticker)
        .bind(start)
        .bind(end)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl SeriesStore for DbRepository {
    async fn fresh_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        max_age: Duration,
    ) -> Result<Option<Vec<DailyBar>>, DbError> {
        let Some(fetched_at) = self.last_fetch(ticker, start, end).await? else {
            return Ok(None);
        };
        let age = Utc::now().signed_duration_since(fetched_at);
        let fresh = age.to_std().map(|age| age <= max_age).unwrap_or(true);
        if !fresh {
            return Ok(None);
        }
        self.load_bars(ticker, start, end).await.map(Some)
    }

    async fn store_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        bars: &[DailyBar],
    ) -> Result<(), DbError> {
        self.save_series(ticker, start, end, bars).await
    }
}
