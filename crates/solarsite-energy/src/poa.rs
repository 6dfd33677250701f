//! Plane-of-array irradiance
//!
//! Isotropic-sky transposition of horizontal irradiance onto a tilted
//! panel. Hourly values are summed into daily energy per UTC date.

use crate::error::validate_coordinates;
use crate::{angle_of_incidence, solar_position, EnergyError, HourlyIrradiance, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Ground reflectance used when none is given
pub const DEFAULT_ALBEDO: f64 = 0.2;

/// Plane-of-array irradiance broken into components, W/m²
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoaComponents {
    /// Direct beam on the panel
    pub beam: f64,
    /// Diffuse sky irradiance seen by the panel
    pub sky_diffuse: f64,
    /// Ground-reflected irradiance seen by the panel
    pub ground_reflected: f64,
}

impl PoaComponents {
    /// Total irradiance on the panel
    pub fn global(&self) -> f64 {
        self.beam + self.sky_diffuse + self.ground_reflected
    }
}

/// Transpose one hour of irradiance onto a panel
///
/// Negative inputs are treated as zero. Beam is zero when the sun is
/// below the horizon or behind the panel.
pub fn poa_irradiance(
    sample: &HourlyIrradiance,
    lat: f64,
    lng: f64,
    tilt_deg: f64,
    azimuth_deg: f64,
    albedo: f64,
) -> PoaComponents {
    let ghi = sample.ghi.max(0.0);
    let dni = sample.dni.max(0.0);
    let dhi = sample.dhi.max(0.0);

    let sun = solar_position(lat, lng, sample.time);
    let cos_tilt = tilt_deg.to_radians().cos();

    let beam = if sun.is_daylight() {
        let aoi = angle_of_incidence(&sun, tilt_deg, azimuth_deg);
        dni * aoi.to_radians().cos().max(0.0)
    } else {
        0.0
    };

    PoaComponents {
        beam,
        sky_diffuse: dhi * (1.0 + cos_tilt) / 2.0,
        ground_reflected: ghi * albedo * (1.0 - cos_tilt) / 2.0,
    }
}

/// POA irradiance for one hour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoa {
    /// Start of the hour (UTC)
    pub time: DateTime<Utc>,
    /// Mean irradiance on the panel, W/m²
    pub poa_wm2: f64,
    /// Energy on the panel over the hour, kWh/m²
    pub poa_kwh: f64,
}

/// POA energy for one UTC date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoa {
    /// UTC date
    pub date: NaiveDate,
    /// Energy on the panel over the day, kWh/m²
    pub poa_kwh: f64,
}

/// Hourly and daily POA series for a site
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PoaSeries {
    /// One entry per input hour, in input order
    pub hourly: Vec<HourlyPoa>,
    /// One entry per UTC date, ascending
    pub daily: Vec<DailyPoa>,
}

impl PoaSeries {
    /// Total energy over the series, kWh/m²
    pub fn total_kwh(&self) -> f64 {
        self.daily.iter().map(|d| d.poa_kwh).sum()
    }
}

/// Compute hourly and daily POA irradiance
///
/// # Errors
/// Returns an error for invalid coordinates, a tilt outside `[0, 90]`,
/// a non-finite azimuth, or an albedo outside `[0, 1]`
pub fn compute_poa(
    samples: &[HourlyIrradiance],
    lat: f64,
    lng: f64,
    tilt_deg: f64,
    azimuth_deg: f64,
    albedo: f64,
) -> Result<PoaSeries> {
    validate_coordinates(lat, lng)?;
    if !(0.0..=90.0).contains(&tilt_deg) {
        return Err(EnergyError::InvalidInput(format!(
            "tilt must be between 0 and 90 degrees, got {}",
            tilt_deg
        )));
    }
    if !azimuth_deg.is_finite() {
        return Err(EnergyError::InvalidInput("azimuth must be finite".to_string()));
    }
    if !(0.0..=1.0).contains(&albedo) {
        return Err(EnergyError::InvalidInput(format!(
            "albedo must be between 0 and 1, got {}",
            albedo
        )));
    }

    let azimuth_deg = azimuth_deg.rem_euclid(360.0);
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    let hourly: Vec<HourlyPoa> = samples
        .iter()
        .map(|sample| {
            let poa_wm2 = poa_irradiance(sample, lat, lng, tilt_deg, azimuth_deg, albedo).global();
            let poa_kwh = poa_wm2 / 1000.0;
            *daily.entry(sample.time.date_naive()).or_insert(0.0) += poa_kwh;
            HourlyPoa {
                time: sample.time,
                poa_wm2,
                poa_kwh,
            }
        })
        .collect();

    let daily: Vec<DailyPoa> = daily
        .into_iter()
        .map(|(date, poa_kwh)| DailyPoa { date, poa_kwh })
        .collect();

    debug!(
        lat,
        lng,
        tilt_deg,
        azimuth_deg,
        hours = hourly.len(),
        days = daily.len(),
        "Computed POA series"
    );

    Ok(PoaSeries { hourly, daily })
}
