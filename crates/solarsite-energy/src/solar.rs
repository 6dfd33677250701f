//! Low-precision solar geometry
//!
//! Fourier-series equation of time and declination (Spencer 1971, as used
//! by the NOAA general solar position calculations). Accurate to a few
//! tenths of a degree, which is plenty for hourly irradiance.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

/// Sun position for an instant and location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Angle between the sun and the local vertical, degrees
    pub zenith_deg: f64,
    /// Sun azimuth, degrees clockwise from north
    pub azimuth_deg: f64,
    /// Sun elevation above the horizon, degrees
    pub elevation_deg: f64,
}

impl SolarPosition {
    /// Whether the sun is above the horizon
    pub fn is_daylight(&self) -> bool {
        self.zenith_deg < 90.0
    }
}

/// Solar position at `time` for a site at `lat`, `lng` (decimal degrees)
pub fn solar_position(lat: f64, lng: f64, time: DateTime<Utc>) -> SolarPosition {
    let day_of_year = f64::from(time.ordinal());
    let hour = f64::from(time.hour());
    let minutes = f64::from(time.hour() * 60 + time.minute()) + f64::from(time.second()) / 60.0;

    // Fractional year in radians
    let gamma = 2.0 * PI / 365.0 * (day_of_year - 1.0 + (hour - 12.0) / 24.0);

    let eqtime = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());

    let decl = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let true_solar_time = minutes + eqtime + 4.0 * lng;
    let hour_angle = (true_solar_time / 4.0 - 180.0).to_radians();
    let phi = lat.to_radians();

    let cos_zenith = (phi.sin() * decl.sin() + phi.cos() * decl.cos() * hour_angle.cos()).clamp(-1.0, 1.0);
    let zenith_deg = cos_zenith.acos().to_degrees();

    let azimuth = hour_angle
        .sin()
        .atan2(hour_angle.cos() * phi.sin() - decl.tan() * phi.cos())
        .to_degrees();
    let azimuth_deg = (azimuth + 180.0).rem_euclid(360.0);

    SolarPosition {
        zenith_deg,
        azimuth_deg,
        elevation_deg: 90.0 - zenith_deg,
    }
}

/// Angle between the sun and the panel normal, degrees
///
/// `tilt_deg` is measured from horizontal, `azimuth_deg` clockwise from
/// north.
pub fn angle_of_incidence(sun: &SolarPosition, tilt_deg: f64, azimuth_deg: f64) -> f64 {
    let zenith = sun.zenith_deg.to_radians();
    let tilt = tilt_deg.to_radians();
    let relative_azimuth = (sun.azimuth_deg - azimuth_deg).to_radians();

    let cos_aoi = zenith.cos() * tilt.cos() + zenith.sin() * tilt.sin() * relative_azimuth.cos();
    cos_aoi.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_equator_equinox_noon() {
        // 12:00 UTC at lng 0 on the March equinox: sun nearly overhead
        let time = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let pos = solar_position(0.0, 0.0, time);
        assert!(pos.zenith_deg < 3.0, "zenith {}", pos.zenith_deg);
        assert!(pos.is_daylight());
    }

    #[test]
    fn test_sydney_summer_noon_sun_in_north() {
        // Local solar noon in Sydney is about 01:55 UTC
        let time = Utc.with_ymd_and_hms(2024, 1, 15, 2, 0, 0).unwrap();
        let pos = solar_position(-33.8688, 151.2093, time);
        assert!(pos.elevation_deg > 70.0, "elevation {}", pos.elevation_deg);
        assert!(
            pos.azimuth_deg < 60.0 || pos.azimuth_deg > 300.0,
            "azimuth {}",
            pos.azimuth_deg
        );
    }

    #[test]
    fn test_sydney_midnight_is_dark() {
        // 14:00 UTC is around midnight in Sydney
        let time = Utc.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap();
        let pos = solar_position(-33.8688, 151.2093, time);
        assert!(!pos.is_daylight());
        assert!(pos.elevation_deg < 0.0);
    }

    #[test]
    fn test_morning_sun_in_east() {
        // 09:00 local in Perth (UTC+8)
        let time = Utc.with_ymd_and_hms(2024, 9, 22, 1, 0, 0).unwrap();
        let pos = solar_position(-31.95, 115.86, time);
        assert!(pos.azimuth_deg > 45.0 && pos.azimuth_deg < 135.0, "azimuth {}", pos.azimuth_deg);
    }

    #[test]
    fn test_flat_panel_aoi_equals_zenith() {
        let sun = SolarPosition {
            zenith_deg: 35.0,
            azimuth_deg: 120.0,
            elevation_deg: 55.0,
        };
        assert!((angle_of_incidence(&sun, 0.0, 0.0) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_panel_facing_sun() {
        let sun = SolarPosition {
            zenith_deg: 40.0,
            azimuth_deg: 10.0,
            elevation_deg: 50.0,
        };
        assert!(angle_of_incidence(&sun, 40.0, 10.0).abs() < 1e-6);
        assert!((angle_of_incidence(&sun, 40.0, 190.0) - 80.0).abs() < 1e-6);
    }
}
