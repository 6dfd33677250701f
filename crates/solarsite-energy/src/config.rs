//! Configuration for the shading estimator

use crate::{EnergyError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the placeholder shading estimator
///
/// # Examples
///
/// ```
/// use solarsite_energy::EstimatorConfig;
///
/// let config = EstimatorConfig::default();
/// assert_eq!(config.max_shading, 0.35);
///
/// // No jitter: repeatable estimates for tests and demos
/// let config = EstimatorConfig::deterministic();
/// assert_eq!(config.jitter_amplitude, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Distance (decimal degrees) within which a site joins a city bucket
    /// Default: 1.0
    #[serde(default = "default_bucket_radius")]
    pub bucket_radius_deg: f64,

    /// Half-width of the random jitter added to the base shading
    /// Default: 0.02
    #[serde(default = "default_jitter")]
    pub jitter_amplitude: f64,

    /// Upper clamp for the final shading fraction
    /// Default: 0.35
    #[serde(default = "default_max_shading")]
    pub max_shading: f64,
}

fn default_bucket_radius() -> f64 {
    1.0
}

fn default_jitter() -> f64 {
    0.02
}

fn default_max_shading() -> f64 {
    0.35
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            bucket_radius_deg: default_bucket_radius(),
            jitter_amplitude: default_jitter(),
            max_shading: default_max_shading(),
        }
    }
}

impl EstimatorConfig {
    /// Configuration without jitter
    pub fn deterministic() -> Self {
        Self {
            jitter_amplitude: 0.0,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.bucket_radius_deg.is_finite() && self.bucket_radius_deg > 0.0) {
            return Err(EnergyError::Config(
                "bucket_radius_deg must be greater than 0".to_string(),
            ));
        }
        if !(self.jitter_amplitude.is_finite() && self.jitter_amplitude >= 0.0) {
            return Err(EnergyError::Config(
                "jitter_amplitude must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_shading) {
            return Err(EnergyError::Config(
                "max_shading must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
