//! Integration tests for the POWER cache
//!
//! Uses a client pointed at a closed local port, so any request that gets
//! past the cache fails fast.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use solarsite_energy::HourlyIrradiance;
use solarsite_power::{PowerCache, PowerClient, PowerConfig, PowerError};
use tempfile::TempDir;

fn offline_client() -> PowerClient {
    let config = PowerConfig {
        endpoint: "http://127.0.0.1:9/api/temporal/hourly/point".to_string(),
        timeout_secs: 2,
        ..PowerConfig::default()
    };
    PowerClient::new(&config).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rows(hours: i64) -> Vec<HourlyIrradiance> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..hours)
        .map(|h| HourlyIrradiance {
            time: start + Duration::hours(h),
            ghi: 500.0 + h as f64,
            dni: 700.0,
            dhi: 90.0,
            temp_c: 26.0,
            rh_pct: 55.0,
            wind_ms: 4.0,
        })
        .collect()
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let dir = TempDir::new().unwrap();
    let cache = PowerCache::new(dir.path());
    let expected = rows(24);

    cache
        .store(-33.8688, 151.2093, date(2024, 1, 1), date(2024, 1, 1), &expected)
        .unwrap();

    let loaded = cache
        .cached_hourly(&offline_client(), -33.8688, 151.2093, date(2024, 1, 1), date(2024, 1, 1))
        .await
        .unwrap();

    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn test_different_end_date_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let cache = PowerCache::new(dir.path());
    cache
        .store(-33.8688, 151.2093, date(2024, 1, 1), date(2024, 1, 1), &rows(24))
        .unwrap();

    assert!(cache
        .load(-33.8688, 151.2093, date(2024, 1, 1), date(2024, 1, 2))
        .is_none());

    let result = cache
        .cached_hourly(&offline_client(), -33.8688, 151.2093, date(2024, 1, 1), date(2024, 1, 2))
        .await;
    assert!(matches!(result, Err(PowerError::Http(_))));
}

#[tokio::test]
async fn test_failed_fetch_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let cache = PowerCache::new(dir.path().join("nested"));

    let result = cache
        .cached_hourly(&offline_client(), -31.95, 115.86, date(2024, 2, 1), date(2024, 2, 3))
        .await;

    assert!(result.is_err());
    assert!(!cache.path_for(-31.95, 115.86, date(2024, 2, 1)).exists());
}

#[test]
fn test_corrupt_file_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let cache = PowerCache::new(dir.path());
    let path = cache.path_for(-27.47, 153.03, date(2024, 5, 1));
    std::fs::write(&path, "not json").unwrap();

    assert!(cache.load(-27.47, 153.03, date(2024, 5, 1), date(2024, 5, 1)).is_none());
}

#[test]
fn test_store_creates_directory() {
    let dir = TempDir::new().unwrap();
    let cache = PowerCache::new(dir.path().join("a").join("b"));
    let path = cache
        .store(-34.93, 138.60, date(2024, 7, 1), date(2024, 7, 1), &rows(3))
        .unwrap();

    assert!(path.exists());
    assert_eq!(path.file_name().unwrap(), "-34.9300_138.6000_20240701.json");
}

#[tokio::test]
async fn test_invalid_range_rejected_before_cache() {
    let dir = TempDir::new().unwrap();
    let cache = PowerCache::new(dir.path());
    let result = cache
        .cached_hourly(&offline_client(), -33.0, 151.0, date(2024, 1, 5), date(2024, 1, 1))
        .await;
    assert!(matches!(result, Err(PowerError::InvalidRequest(_))));
}
