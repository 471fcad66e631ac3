//! Round trips against a live PostgreSQL database.
//!
//! Run with `FINAGENT_TEST_DATABASE_URL=postgres://... cargo test -p database -- --ignored`.

use chrono::{NaiveDate, Utc};
use configuration::DatabaseSettings;
use core_types::DailyBar;
use database::{DbRepository, connect, run_migrations};

async fn repository() -> DbRepository {
    let url = std::env::var("FINAGENT_TEST_DATABASE_URL")
        .expect("FINAGENT_TEST_DATABASE_URL must point at a scratch database");
    let settings = DatabaseSettings {
        url,
        max_connections: 2,
        cache_ttl_secs: 60,
    };
    let pool = connect(&settings).await.expect("database reachable");
    run_migrations(&pool).await.expect("migrations apply");
    DbRepository::new(pool)
}

fn unique_ticker() -> String {
    format!("T{}", Utc::now().timestamp_micros())
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[tokio::test]
#[ignore = "needs FINAGENT_TEST_DATABASE_URL"]
async fn stored_bars_are_read_back_in_order() {
    let repo = repository().await;
    let ticker = unique_ticker();
    let bars = vec![
        DailyBar::flat(day(2), 10.0, 100),
        DailyBar::flat(day(3), 11.0, 200),
    ];

    repo.save_series(&ticker, day(1), day(5), &bars).await.unwrap();

    assert_eq!(repo.load_bars(&ticker, day(1), day(5)).await.unwrap(), bars);
    assert!(repo.last_fetch(&ticker, day(1), day(5)).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "needs FINAGENT_TEST_DATABASE_URL"]
async fn overlapping_download_invalidates_the_older_range() {
    let repo = repository().await;
    let ticker = unique_ticker();

    repo.save_series(&ticker, day(1), day(10), &[DailyBar::flat(day(5), 10.0, 100)])
        .await
        .unwrap();
    repo.save_series(&ticker, day(4), day(20), &[DailyBar::flat(day(5), 20.0, 100)])
        .await
        .unwrap();

    assert!(repo.last_fetch(&ticker, day(1), day(10)).await.unwrap().is_none());
    assert!(repo.last_fetch(&ticker, day(4), day(20)).await.unwrap().is_some());
    let bars = repo.load_bars(&ticker, day(4), day(20)).await.unwrap();
    assert_eq!(bars[0].close, 20.0);
}

#[tokio::test]
#[ignore = "needs FINAGENT_TEST_DATABASE_URL"]
async fn disjoint_ranges_stay_fresh() {
    let repo = repository().await;
    let ticker = unique_ticker();

    repo.save_series(&ticker, day(1), day(5), &[DailyBar::flat(day(2), 10.0, 1)])
        .await
        .unwrap();
    repo.save_series(&ticker, day(6), day(9), &[DailyBar::flat(day(8), 12.0, 1)])
        .await
        .unwrap();

    assert!(repo.last_fetch(&ticker, day(1), day(5)).await.unwrap().is_some());
    assert!(repo.last_fetch(&ticker, day(6), day(9)).await.unwrap().is_some());
}
