//! Hourly weather/irradiance samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hour of surface irradiance and weather at a point
///
/// Irradiance values are in W/m², averaged over the hour that starts at
/// `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyIrradiance {
    /// Start of the hour (UTC)
    pub time: DateTime<Utc>,
    /// Global horizontal irradiance
    pub ghi: f64,
    /// Direct normal irradiance
    pub dni: f64,
    /// Diffuse horizontal irradiance
    pub dhi: f64,
    /// Air temperature at 2 m, °C
    pub temp_c: f64,
    /// Relative humidity at 2 m, %
    pub rh_pct: f64,
    /// Wind speed at 10 m, m/s
    pub wind_ms: f64,
}
