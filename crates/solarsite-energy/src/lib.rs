//! SolarSite Energy
//!
//! Site-level energy estimates that sit around the arbitrated site record.
//!
//! # Overview
//!
//! - **Shading estimation**: placeholder roof shading from location and
//!   orientation, clamped to a fixed maximum
//! - **Solar geometry**: low-precision solar position for any UTC instant
//! - **POA irradiance**: isotropic-sky transposition of hourly GHI/DNI/DHI onto
//!   a tilted panel, with daily totals
//! - **Tariffs**: time-of-use import/export/demand rates
//! - **Financial fallbacks**: rough solar ROI and battery figures used when no
//!   trained model is available
//! - **Battery dispatch**: cheapest hourly charge/discharge plan under power,
//!   SoC and export limits, plus its QUBO coefficients
//!
//! # Usage
//!
//! ```
//! use solarsite_energy::{EstimatorConfig, NoJitter, Orientation, ShadingEstimator, ShadingRequest};
//!
//! let estimator = ShadingEstimator::new(EstimatorConfig::deterministic());
//! let request = ShadingRequest::new(-33.8688, 151.2093, Orientation::North);
//! let estimate = estimator.estimate(&request, &mut NoJitter).unwrap();
//! assert!(estimate.shading <= 0.35);
//! ```
//!
//! # Configuration
//!
//! The estimator reads a TOML section:
//!
//! ```toml
//! [shading]
//! bucket_radius_deg = 1.0
//! jitter_amplitude = 0.02
//! max_shading = 0.35
//! ```

#![warn(missing_docs)]

mod config;
mod dispatch;
mod error;
mod finance;
mod irradiance;
mod poa;
mod qubo;
mod shading;
mod solar;
mod tariff;

pub use config::EstimatorConfig;
pub use dispatch::{plan_dispatch, BatteryConstraints, DispatchPlan, DispatchRequest, DispatchStep};
pub use error::{EnergyError, Result};
pub use finance::{
    default_cycle_schedule, estimate_battery_roi, estimate_solar_roi, BatteryEstimate, BatteryInput,
    CommonInput, DispatchSlot, RoiEstimate,
};
pub use irradiance::HourlyIrradiance;
pub use poa::{compute_poa, poa_irradiance, DailyPoa, HourlyPoa, PoaComponents, PoaSeries, DEFAULT_ALBEDO};
pub use qubo::{build_qubo, Qubo, QuboTerm, QuboVar, SIMULTANEOUS_PENALTY};
pub use shading::{
    estimate_shading, Jitter, NoJitter, Orientation, RandomJitter, RegionBucket, ShadingAdapter,
    ShadingEstimate, ShadingEstimator, ShadingRequest,
};
pub use solar::{angle_of_incidence, solar_position, SolarPosition};
pub use tariff::{ClockTime, Tariff, TariffRate, DEFAULT_IMPORT_PRICE};
