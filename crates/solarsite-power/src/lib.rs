//! SolarSite POWER client
//!
//! Hourly irradiance and weather from the NASA POWER point API, with a
//! JSON file cache.
//!
//! # Features
//!
//! - Async HTTP requests with a configurable endpoint and timeout
//! - Parsing of the hourly `properties.parameter` payload into
//!   [`HourlyIrradiance`] rows
//! - One cache file per site and start date
//!
//! A failed request is returned as an error. No substitute data is made up.
//!
//! # Examples
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use solarsite_power::{PowerCache, PowerClient, PowerConfig};
//!
//! # async fn run() -> Result<(), solarsite_power::PowerError> {
//! let config = PowerConfig::default();
//! let client = PowerClient::new(&config)?;
//! let cache = PowerCache::new(&config.cache_dir);
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
//! let hourly = cache.cached_hourly(&client, -33.8688, 151.2093, start, end).await?;
//! println!("{} hours", hourly.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`HourlyIrradiance`]: solarsite_energy::HourlyIrradiance

#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod parse;

pub use cache::PowerCache;
pub use client::PowerClient;
pub use config::{PowerConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
pub use error::{PowerError, Result};
pub use parse::parse_hourly;
