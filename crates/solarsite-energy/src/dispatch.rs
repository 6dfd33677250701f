//! Battery dispatch planning
//!
//! Chooses an hourly charge/discharge schedule that minimises the cost of
//! grid imports less feed-in credit. The state of charge is discretised into
//! a fixed grid and the plan is found by dynamic programming over that grid,
//! so every plan respects the power limits, the SoC bounds, and never charges
//! and discharges in the same hour.
//!
//! Each step is one hour, so kW and kWh per step are interchangeable. SoC is
//! a fraction of `capacity_kwh`; the default capacity of 1 kWh makes SoC and
//! stored energy the same number.

use crate::{EnergyError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Steps between `soc_min` and `soc_max`
const SOC_STEPS: usize = 100;

/// Slack when checking power limits against grid-derived flows
const LIMIT_TOLERANCE: f64 = 1e-9;

/// Objective charge per kWh moved through the battery
///
/// Small enough never to outweigh a real price difference; it breaks ties in
/// favour of leaving the battery idle.
const THROUGHPUT_TIE_BREAK: f64 = 1e-9;

fn default_power_max() -> f64 {
    5.0
}

fn default_soc_min() -> f64 {
    0.1
}

fn default_soc_max() -> f64 {
    1.0
}

fn default_efficiency() -> f64 {
    0.95
}

fn default_export_cap() -> f64 {
    5.0
}

fn default_soc_initial() -> f64 {
    0.5
}

fn default_capacity() -> f64 {
    1.0
}

fn default_feed_in_ratio() -> f64 {
    0.1
}

/// Battery and grid-connection limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryConstraints {
    /// Maximum charge power, kW
    #[serde(rename = "P_ch_max", alias = "p_ch_max", default = "default_power_max")]
    pub p_ch_max: f64,
    /// Maximum discharge power, kW
    #[serde(rename = "P_dis_max", alias = "p_dis_max", default = "default_power_max")]
    pub p_dis_max: f64,
    /// Lowest allowed state of charge, fraction
    #[serde(default = "default_soc_min")]
    pub soc_min: f64,
    /// Highest allowed state of charge, fraction
    #[serde(default = "default_soc_max")]
    pub soc_max: f64,
    /// Charging efficiency
    #[serde(default = "default_efficiency")]
    pub eta_ch: f64,
    /// Discharging efficiency
    #[serde(default = "default_efficiency")]
    pub eta_dis: f64,
    /// Maximum export to the grid, kW
    #[serde(default = "default_export_cap")]
    pub export_cap: f64,
    /// State of charge at the start of the first hour
    #[serde(default = "default_soc_initial")]
    pub soc_initial: f64,
    /// Usable capacity, kWh
    #[serde(default = "default_capacity")]
    pub capacity_kwh: f64,
    /// Feed-in credit as a share of the import price
    #[serde(default = "default_feed_in_ratio")]
    pub feed_in_ratio: f64,
}

impl Default for BatteryConstraints {
    fn default() -> Self {
        Self {
            p_ch_max: default_power_max(),
            p_dis_max: default_power_max(),
            soc_min: default_soc_min(),
            soc_max: default_soc_max(),
            eta_ch: default_efficiency(),
            eta_dis: default_efficiency(),
            export_cap: default_export_cap(),
            soc_initial: default_soc_initial(),
            capacity_kwh: default_capacity(),
            feed_in_ratio: default_feed_in_ratio(),
        }
    }
}

impl BatteryConstraints {
    /// Validate the limits
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("P_ch_max", self.p_ch_max),
            ("P_dis_max", self.p_dis_max),
            ("export_cap", self.export_cap),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EnergyError::InvalidInput(format!("{} must be non-negative, got {}", name, value)));
            }
        }
        if !(0.0..=1.0).contains(&self.soc_min) || !(0.0..=1.0).contains(&self.soc_max) || self.soc_min > self.soc_max {
            return Err(EnergyError::InvalidInput(format!(
                "SoC bounds must satisfy 0 <= soc_min <= soc_max <= 1, got [{}, {}]",
                self.soc_min, self.soc_max
            )));
        }
        if !(self.soc_min..=self.soc_max).contains(&self.soc_initial) {
            return Err(EnergyError::InvalidInput(format!(
                "soc_initial {} is outside [{}, {}]",
                self.soc_initial, self.soc_min, self.soc_max
            )));
        }
        for (name, eta) in [("eta_ch", self.eta_ch), ("eta_dis", self.eta_dis)] {
            if !(eta > 0.0 && eta <= 1.0) {
                return Err(EnergyError::InvalidInput(format!("{} must be in (0, 1], got {}", name, eta)));
            }
        }
        if !(self.capacity_kwh.is_finite() && self.capacity_kwh > 0.0) {
            return Err(EnergyError::InvalidInput(format!(
                "capacity_kwh must be greater than 0, got {}",
                self.capacity_kwh
            )));
        }
        if !(0.0..=1.0).contains(&self.feed_in_ratio) {
            return Err(EnergyError::InvalidInput(format!(
                "feed_in_ratio must be in [0, 1], got {}",
                self.feed_in_ratio
            )));
        }
        Ok(())
    }
}

/// Hourly prices, generation and demand to plan over
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Import price per hour, AUD/kWh
    pub prices: Vec<f64>,
    /// PV generation per hour, kWh
    pub pv: Vec<f64>,
    /// Site demand per hour, kWh
    pub load: Vec<f64>,
    /// Battery limits
    #[serde(default)]
    pub constraints: BatteryConstraints,
}

impl DispatchRequest {
    /// Validate series lengths, values and constraints
    pub fn validate(&self) -> Result<()> {
        let hours = self.prices.len();
        if self.pv.len() != hours || self.load.len() != hours {
            return Err(EnergyError::InvalidInput(format!(
                "prices, pv and load must have the same length, got {}, {} and {}",
                hours,
                self.pv.len(),
                self.load.len()
            )));
        }
        if self.prices.iter().any(|p| !p.is_finite()) {
            return Err(EnergyError::InvalidInput("prices must be finite".to_string()));
        }
        if self.pv.iter().chain(&self.load).any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(EnergyError::InvalidInput(
                "pv and load must be finite and non-negative".to_string(),
            ));
        }
        self.constraints.validate()
    }

    /// Grid cost with the battery left idle
    pub fn idle_cost(&self) -> f64 {
        (0..self.prices.len())
            .map(|hour| self.grid_flows(hour, 0.0, 0.0).cost)
            .sum()
    }

    fn grid_flows(&self, hour: usize, charge_kw: f64, discharge_kw: f64) -> GridFlows {
        let price = self.prices[hour];
        let net = self.load[hour] + charge_kw - self.pv[hour] - discharge_kw;
        let (import_kw, export_kw, curtailed_kw) = if net >= 0.0 {
            (net, 0.0, 0.0)
        } else {
            let surplus = -net;
            let export = surplus.min(self.constraints.export_cap);
            (0.0, export, surplus - export)
        };
        GridFlows {
            import_kw,
            export_kw,
            curtailed_kw,
            cost: price * import_kw - price * self.constraints.feed_in_ratio * export_kw,
        }
    }

    /// Battery power needed to move between two SoC levels, if allowed
    fn battery_flows(&self, from: f64, to: f64) -> Option<(f64, f64)> {
        let c = &self.constraints;
        let stored = (to - from) * c.capacity_kwh;
        let (charge, discharge) = if stored >= 0.0 {
            (stored / c.eta_ch, 0.0)
        } else {
            (0.0, -stored * c.eta_dis)
        };
        if charge > c.p_ch_max + LIMIT_TOLERANCE || discharge > c.p_dis_max + LIMIT_TOLERANCE {
            return None;
        }
        Some((charge, discharge))
    }
}

#[derive(Debug, Clone, Copy)]
struct GridFlows {
    import_kw: f64,
    export_kw: f64,
    curtailed_kw: f64,
    cost: f64,
}

/// One planned hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchStep {
    /// Hour index from the start of the plan
    pub hour: usize,
    /// Charge power, kW
    pub charge_kw: f64,
    /// Discharge power, kW
    pub discharge_kw: f64,
    /// Grid import, kW
    pub import_kw: f64,
    /// Grid export, kW
    pub export_kw: f64,
    /// PV surplus above the export cap, kW
    pub curtailed_kw: f64,
}

/// Cost-minimising battery schedule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// Hourly flows
    pub schedule: Vec<DispatchStep>,
    /// State of charge at the start of each hour
    pub soc_series: Vec<f64>,
    /// Import cost less feed-in credit, AUD
    pub cost: f64,
}

/// Plan the cheapest battery schedule for a request
///
/// # Errors
/// Returns [`EnergyError::InvalidInput`] for mismatched series, negative
/// generation or demand, or invalid constraints
pub fn plan_dispatch(request: &DispatchRequest) -> Result<DispatchPlan> {
    request.validate()?;
    let hours = request.prices.len();
    if hours == 0 {
        return Ok(DispatchPlan::default());
    }

    let (levels, start) = soc_levels(&request.constraints);
    let n = levels.len();

    let mut best = vec![f64::INFINITY; n];
    best[start] = 0.0;
    let mut parents = vec![vec![usize::MAX; n]; hours];

    for (hour, parent) in parents.iter_mut().enumerate() {
        let mut next = vec![f64::INFINITY; n];
        for (from, &so_far) in best.iter().enumerate() {
            if !so_far.is_finite() {
                continue;
            }
            for to in 0..n {
                let Some((charge, discharge)) = request.battery_flows(levels[from], levels[to]) else {
                    continue;
                };
                let grid = request.grid_flows(hour, charge, discharge);
                let total = so_far + grid.cost + THROUGHPUT_TIE_BREAK * (charge + discharge);
                if total < next[to] {
                    next[to] = total;
                    parent[to] = from;
                }
            }
        }
        best = next;
    }

    let mut state = best
        .iter()
        .enumerate()
        .filter(|(_, cost)| cost.is_finite())
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(index, _)| index)
        .ok_or_else(|| EnergyError::InvalidInput("no feasible dispatch".to_string()))?;

    // Walk back from the cheapest final state
    let mut path = vec![start; hours + 1];
    for hour in (0..hours).rev() {
        path[hour + 1] = state;
        state = parents[hour][state];
    }

    let mut schedule = Vec::with_capacity(hours);
    let mut cost = 0.0;
    for hour in 0..hours {
        let (charge_kw, discharge_kw) = request
            .battery_flows(levels[path[hour]], levels[path[hour + 1]])
            .unwrap_or((0.0, 0.0));
        let grid = request.grid_flows(hour, charge_kw, discharge_kw);
        cost += grid.cost;
        schedule.push(DispatchStep {
            hour,
            charge_kw,
            discharge_kw,
            import_kw: grid.import_kw,
            export_kw: grid.export_kw,
            curtailed_kw: grid.curtailed_kw,
        });
    }
    let soc_series = path[..hours].iter().map(|&i| levels[i]).collect();

    debug!(hours, levels = n, cost, idle_cost = request.idle_cost(), "Planned battery dispatch");

    Ok(DispatchPlan {
        schedule,
        soc_series,
        cost,
    })
}

/// SoC grid including the initial level, and the index of that level
fn soc_levels(c: &BatteryConstraints) -> (Vec<f64>, usize) {
    let span = c.soc_max - c.soc_min;
    let mut levels: Vec<f64> = (0..=SOC_STEPS)
        .map(|k| c.soc_min + span * k as f64 / SOC_STEPS as f64)
        .collect();
    levels.push(c.soc_initial);
    levels.sort_by(f64::total_cmp);
    levels.dedup();
    let start = levels
        .iter()
        .position(|&level| level == c.soc_initial)
        .unwrap_or(0);
    (levels, start)
}
