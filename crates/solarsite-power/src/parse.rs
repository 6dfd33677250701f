//! Parsing of POWER hourly responses
//!
//! The payload keeps one map per parameter under `properties.parameter`,
//! keyed by `YYYYMMDDHH` in UTC:
//!
//! ```json
//! {"properties": {"parameter": {
//!     "ALLSKY_SFC_SW_DWN": {"2024010112": 812.4},
//!     "DNI": {"2024010112": 905.1},
//!     ...
//! }}}
//! ```

use crate::{PowerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use solarsite_energy::HourlyIrradiance;

/// Parameters requested from the API, in query order
pub const PARAMETERS: [&str; 6] = ["ALLSKY_SFC_SW_DWN", "DNI", "DHI", "T2M", "RH2M", "WS10M"];

/// NASA's fill value for missing data
const FILL_VALUE: f64 = -999.0;

// Values used when a parameter has no usable entry for an hour
const FALLBACK_GHI: f64 = 800.0;
const FALLBACK_DNI: f64 = 900.0;
const FALLBACK_DHI: f64 = 100.0;
const FALLBACK_T2M: f64 = 25.0;
const FALLBACK_RH2M: f64 = 60.0;
const FALLBACK_WS10M: f64 = 3.0;

/// Parse a `YYYYMMDDHH` key as a UTC instant
pub fn parse_timestamp(key: &str) -> Result<DateTime<Utc>> {
    let invalid = || PowerError::InvalidTimestamp(key.to_string());
    if key.len() != 10 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = key[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = key[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = key[6..8].parse().map_err(|_| invalid())?;
    let hour: u32 = key[8..10].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(invalid)
}

/// Parse the hourly payload into rows sorted by time
///
/// Hours come from the `DNI` map. Other parameters missing for an hour, or
/// holding the fill value, fall back to fixed defaults.
///
/// # Errors
/// Returns [`PowerError::NoData`] when there are no hourly keys, or
/// [`PowerError::InvalidTimestamp`] for a malformed key
pub fn parse_hourly(payload: &Value) -> Result<Vec<HourlyIrradiance>> {
    let parameters = &payload["properties"]["parameter"];
    let keys = match parameters["DNI"].as_object() {
        Some(map) if !map.is_empty() => map.keys(),
        _ => return Err(PowerError::NoData),
    };

    let value = |name: &str, key: &str, fallback: f64| -> f64 {
        parameters[name][key]
            .as_f64()
            .filter(|v| v.is_finite() && *v > FILL_VALUE)
            .unwrap_or(fallback)
    };

    let mut rows = keys
        .map(|key| {
            Ok(HourlyIrradiance {
                time: parse_timestamp(key)?,
                ghi: value("ALLSKY_SFC_SW_DWN", key, FALLBACK_GHI),
                dni: value("DNI", key, FALLBACK_DNI),
                dhi: value("DHI", key, FALLBACK_DHI),
                temp_c: value("T2M", key, FALLBACK_T2M),
                rh_pct: value("RH2M", key, FALLBACK_RH2M),
                wind_ms: value("WS10M", key, FALLBACK_WS10M),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by_key(|row| row.time);
    Ok(rows)
}
