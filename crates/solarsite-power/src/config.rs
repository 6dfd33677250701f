//! POWER client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// NASA POWER hourly point endpoint
pub const DEFAULT_ENDPOINT: &str = "https://power.larc.nasa.gov/api/temporal/hourly/point";

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`PowerClient`](crate::PowerClient) and
/// [`PowerCache`](crate::PowerCache)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerConfig {
    /// API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    /// Default: 10
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory for cached responses
    /// Default: `<temp dir>/solarsite-power`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("solarsite-power")
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            cache_dir: default_cache_dir(),
        }
    }
}
