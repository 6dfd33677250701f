//! Fallback solar and battery return estimates
//!
//! Rough figures used when no trained model is available. Every estimate
//! is tagged `source_model = "fallback"`. The solar figure ignores the tariff
//! and shading inputs; they are validated but only a trained model uses them.

use crate::{plan_dispatch, DispatchRequest, DispatchStep, EnergyError, Result, Tariff};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SOURCE_MODEL: &str = "fallback";
const MODEL_VERSION: &str = "v0.1";

/// Annual usage assumed when no usage data is given, kWh
const DEFAULT_ANNUAL_USAGE_KWH: f64 = 8000.0;
/// Share of annual usage offset by solar
const SOLAR_OFFSET_FRACTION: f64 = 0.25;
/// Flat retail price assumed by the solar fallback, AUD/kWh
const FALLBACK_PRICE: f64 = 0.30;
/// System size reported when none is given, kW
const DEFAULT_SYSTEM_SIZE_KW: f64 = 6.6;
/// Ratio of the p90 figure to p50
const P90_RATIO: f64 = 1.1;

const BATTERY_ANNUAL_SAVINGS_AUD: f64 = 1800.0;
const BATTERY_PAYBACK_YEARS: f64 = 9.2;

fn default_shading_index() -> f64 {
    0.1
}

fn default_capacity_kwh() -> f64 {
    13.5
}

/// Inputs shared by the solar and battery estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonInput {
    /// Half-hourly consumption, kWh per interval
    #[serde(default)]
    pub usage_30min: Vec<f64>,
    /// Site tariff
    #[serde(default)]
    pub tariff: Tariff,
    /// Shading fraction in `[0, 1]`
    #[serde(default = "default_shading_index")]
    pub shading_index: f64,
    /// Proposed system size, kW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_size_kw: Option<f64>,
}

impl Default for CommonInput {
    fn default() -> Self {
        Self {
            usage_30min: Vec::new(),
            tariff: Tariff::default(),
            shading_index: default_shading_index(),
            system_size_kw: None,
        }
    }
}

impl CommonInput {
    /// Validate the input
    ///
    /// # Errors
    /// Returns [`EnergyError::InvalidInput`] when the shading index is outside
    /// `[0, 1]`, the system size is not positive, or usage contains
    /// non-finite values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.shading_index) {
            return Err(EnergyError::InvalidInput(format!(
                "shading_index must be between 0 and 1, got {}",
                self.shading_index
            )));
        }
        if let Some(size) = self.system_size_kw {
            if !(size.is_finite() && size > 0.0) {
                return Err(EnergyError::InvalidInput(format!(
                    "system_size_kw must be greater than 0, got {}",
                    size
                )));
            }
        }
        if self.usage_30min.iter().any(|v| !v.is_finite()) {
            return Err(EnergyError::InvalidInput(
                "usage_30min must contain finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Annual consumption the fallback assumes, kWh
    ///
    /// The mean sample scaled by 365, or 8000 kWh without usage data.
    pub fn annual_usage_kwh(&self) -> f64 {
        if self.usage_30min.is_empty() {
            return DEFAULT_ANNUAL_USAGE_KWH;
        }
        let total: f64 = self.usage_30min.iter().sum();
        total * 365.0 / self.usage_30min.len() as f64
    }
}

/// Solar return estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiEstimate {
    /// Expected annual bill savings, AUD
    #[serde(rename = "annual_savings_AUD")]
    pub annual_savings_aud: f64,
    /// System size the estimate assumes, kW
    pub system_size_kw: f64,
    /// Median savings
    pub p50: f64,
    /// Optimistic savings
    pub p90: f64,
    /// Model that produced the estimate
    pub source_model: String,
    /// Model version
    pub version: String,
}

/// Estimate annual solar savings
pub fn estimate_solar_roi(input: &CommonInput) -> Result<RoiEstimate> {
    input.validate()?;

    let annual_usage = input.annual_usage_kwh();
    let savings = annual_usage * SOLAR_OFFSET_FRACTION * FALLBACK_PRICE;

    debug!(annual_usage, savings, "Estimated solar ROI");

    Ok(RoiEstimate {
        annual_savings_aud: savings,
        system_size_kw: input.system_size_kw.unwrap_or(DEFAULT_SYSTEM_SIZE_KW),
        p50: savings,
        p90: savings * P90_RATIO,
        source_model: SOURCE_MODEL.to_string(),
        version: MODEL_VERSION.to_string(),
    })
}

/// Inputs to the battery estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryInput {
    /// Shared site inputs
    #[serde(flatten)]
    pub common: CommonInput,
    /// Usable battery capacity, kWh
    #[serde(default = "default_capacity_kwh")]
    pub capacity_kwh: f64,
    /// Hourly prices and flows to plan the cycle schedule from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchRequest>,
}

impl Default for BatteryInput {
    fn default() -> Self {
        Self {
            common: CommonInput::default(),
            capacity_kwh: default_capacity_kwh(),
            dispatch: None,
        }
    }
}

/// One hour of battery dispatch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchSlot {
    /// Hour of day, 0-23
    pub hour: u8,
    /// Charge power, kW
    pub charge_kw: f64,
    /// Discharge power, kW
    pub discharge_kw: f64,
}

impl From<&DispatchStep> for DispatchSlot {
    fn from(step: &DispatchStep) -> Self {
        Self {
            hour: (step.hour % 24) as u8,
            charge_kw: step.charge_kw,
            discharge_kw: step.discharge_kw,
        }
    }
}

/// Battery return estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryEstimate {
    /// Expected annual bill savings, AUD
    #[serde(rename = "annual_savings_AUD")]
    pub annual_savings_aud: f64,
    /// Simple payback, years
    pub payback_years: f64,
    /// Usable capacity the estimate assumes, kWh
    pub capacity_kwh: f64,
    /// Charge/discharge plan
    pub cycle_schedule: Vec<DispatchSlot>,
    /// Grid cost of the planned schedule, when one was planned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_cost: Option<f64>,
    /// Median savings
    pub p50: f64,
    /// Optimistic savings
    pub p90: f64,
    /// Model that produced the estimate
    pub source_model: String,
    /// Model version
    pub version: String,
}

/// Estimate battery savings
///
/// With a dispatch request the cycle schedule is planned from it; without
/// one the fixed overnight/evening schedule is used.
pub fn estimate_battery_roi(input: &BatteryInput) -> Result<BatteryEstimate> {
    input.common.validate()?;
    if !(input.capacity_kwh.is_finite() && input.capacity_kwh > 0.0) {
        return Err(EnergyError::InvalidInput(format!(
            "capacity_kwh must be greater than 0, got {}",
            input.capacity_kwh
        )));
    }

    let (cycle_schedule, dispatch_cost) = match &input.dispatch {
        Some(request) => {
            let plan = plan_dispatch(request)?;
            (plan.schedule.iter().map(DispatchSlot::from).collect(), Some(plan.cost))
        }
        None => (default_cycle_schedule(), None),
    };

    Ok(BatteryEstimate {
        annual_savings_aud: BATTERY_ANNUAL_SAVINGS_AUD,
        payback_years: BATTERY_PAYBACK_YEARS,
        capacity_kwh: input.capacity_kwh,
        cycle_schedule,
        dispatch_cost,
        p50: BATTERY_ANNUAL_SAVINGS_AUD,
        p90: BATTERY_ANNUAL_SAVINGS_AUD * P90_RATIO,
        source_model: SOURCE_MODEL.to_string(),
        version: MODEL_VERSION.to_string(),
    })
}

/// Overnight charge, evening discharge
///
/// Hours 1-5 charge at 3.5 kW, hours 17-21 discharge at 4.2 kW.
pub fn default_cycle_schedule() -> Vec<DispatchSlot> {
    (0..24u8)
        .map(|hour| {
            let (charge_kw, discharge_kw) = match hour {
                1..=5 => (3.5, 0.0),
                17..=21 => (0.0, 4.2),
                _ => (0.0, 0.0),
            };
            DispatchSlot {
                hour,
                charge_kw,
                discharge_kw,
            }
        })
        .collect()
}
