//! QUBO form of the dispatch problem
//!
//! One binary variable per hour for "charge at full power" and one for
//! "discharge at full power". Diagonal terms carry the price of each action;
//! the off-diagonal term penalises doing both in the same hour. The
//! coefficients are meant for an external annealer or QAOA sampler.

use crate::{DispatchRequest, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Penalty on charging and discharging in the same hour
pub const SIMULTANEOUS_PENALTY: f64 = 1000.0;

/// Binary decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum QuboVar {
    /// Charge at full power during the hour
    Charge(usize),
    /// Discharge at full power during the hour
    Discharge(usize),
}

impl fmt::Display for QuboVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuboVar::Charge(hour) => write!(f, "ch_{}", hour),
            QuboVar::Discharge(hour) => write!(f, "dis_{}", hour),
        }
    }
}

impl From<QuboVar> for String {
    fn from(var: QuboVar) -> Self {
        var.to_string()
    }
}

/// One coefficient of the QUBO matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuboTerm {
    /// Row variable
    pub row: QuboVar,
    /// Column variable; equal to `row` for linear terms
    pub col: QuboVar,
    /// Coefficient
    pub coefficient: f64,
}

/// Upper-triangular QUBO coefficients
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Qubo {
    terms: Vec<QuboTerm>,
}

impl Qubo {
    /// All non-zero terms, hour by hour
    pub fn terms(&self) -> &[QuboTerm] {
        &self.terms
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether there are no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient for a pair of variables, in either order
    pub fn coefficient(&self, a: QuboVar, b: QuboVar) -> f64 {
        self.terms
            .iter()
            .find(|t| (t.row == a && t.col == b) || (t.row == b && t.col == a))
            .map(|t| t.coefficient)
            .unwrap_or(0.0)
    }

    /// Objective value when exactly the given variables are set
    pub fn energy(&self, active: &BTreeSet<QuboVar>) -> f64 {
        self.terms
            .iter()
            .filter(|t| active.contains(&t.row) && active.contains(&t.col))
            .map(|t| t.coefficient)
            .sum()
    }
}

/// Build QUBO coefficients for a dispatch request
///
/// Charging costs `price * P_ch_max / eta_ch`, discharging earns
/// `price * P_dis_max * eta_dis`.
pub fn build_qubo(request: &DispatchRequest) -> Result<Qubo> {
    request.validate()?;
    let c = &request.constraints;

    let mut terms = Vec::with_capacity(request.prices.len() * 3);
    for (hour, &price) in request.prices.iter().enumerate() {
        let charge = QuboVar::Charge(hour);
        let discharge = QuboVar::Discharge(hour);
        terms.push(QuboTerm {
            row: charge,
            col: charge,
            coefficient: price * c.p_ch_max / c.eta_ch,
        });
        terms.push(QuboTerm {
            row: discharge,
            col: discharge,
            coefficient: -price * c.p_dis_max * c.eta_dis,
        });
        terms.push(QuboTerm {
            row: charge,
            col: discharge,
            coefficient: SIMULTANEOUS_PENALTY,
        });
    }
    Ok(Qubo { terms })
}
