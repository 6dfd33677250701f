//! On-disk cache of POWER responses
//!
//! One JSON file per site and start date, named
//! `{lat:.4}_{lng:.4}_{YYYYMMDD}.json`. The file records the end date it
//! covers; a request for a different end date is a miss.

use crate::client::validate_request;
use crate::{PowerClient, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use solarsite_energy::HourlyIrradiance;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    start: NaiveDate,
    end: NaiveDate,
    rows: Vec<HourlyIrradiance>,
}

/// File cache for hourly POWER data
#[derive(Debug, Clone)]
pub struct PowerCache {
    dir: PathBuf,
}

impl PowerCache {
    /// Create a cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for a site and start date
    pub fn path_for(&self, lat: f64, lng: f64, start: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{:.4}_{:.4}_{}.json", lat, lng, start.format("%Y%m%d")))
    }

    /// Read cached rows, if a matching entry exists
    ///
    /// An unreadable or corrupt file counts as a miss.
    pub fn load(&self, lat: f64, lng: f64, start: NaiveDate, end: NaiveDate) -> Option<Vec<HourlyIrradiance>> {
        let path = self.path_for(lat, lng, start);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) if entry.start == start && entry.end == end => Some(entry.rows),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache file");
                None
            }
        }
    }

    /// Write rows to the cache
    pub fn store(
        &self,
        lat: f64,
        lng: f64,
        start: NaiveDate,
        end: NaiveDate,
        rows: &[HourlyIrradiance],
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(lat, lng, start);
        let entry = CacheEntry {
            start,
            end,
            rows: rows.to_vec(),
        };
        fs::write(&path, serde_json::to_string(&entry)?)?;
        Ok(path)
    }

    /// Hourly data from the cache, fetching and caching on a miss
    ///
    /// A failed cache write is logged and does not fail the call.
    pub async fn cached_hourly(
        &self,
        client: &PowerClient,
        lat: f64,
        lng: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HourlyIrradiance>> {
        validate_request(lat, lng, start, end)?;

        if let Some(rows) = self.load(lat, lng, start, end) {
            debug!(lat, lng, %start, %end, hours = rows.len(), "POWER cache hit");
            return Ok(rows);
        }

        let rows = client.fetch_hourly(lat, lng, start, end).await?;
        if let Err(e) = self.store(lat, lng, start, end, &rows) {
            warn!(error = %e, "Failed to write POWER cache");
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_naming() {
        let cache = PowerCache::new("/tmp/power");
        let start = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let path = cache.path_for(-33.8688, 151.2093, start);
        assert_eq!(path, PathBuf::from("/tmp/power/-33.8688_151.2093_20240305.json"));
    }

    #[test]
    fn test_path_rounds_to_four_places() {
        let cache = PowerCache::new("cache");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let path = cache.path_for(-33.868_849, 151.2, start);
        assert!(path.ends_with("-33.8688_151.2000_20240101.json"));
    }
}
