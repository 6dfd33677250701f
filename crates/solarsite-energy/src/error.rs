//! Error types for energy estimates

use thiserror::Error;

/// Result type alias for energy operations
pub type Result<T> = std::result::Result<T, EnergyError>;

/// Errors that can occur while estimating shading, irradiance, or returns
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnergyError {
    /// Latitude/longitude outside the valid range or non-finite
    #[error("Invalid coordinates: lat {lat}, lng {lng}")]
    InvalidCoordinates {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lng: f64,
    },

    /// Input value rejected by validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed tariff definition
    #[error("Invalid tariff: {0}")]
    InvalidTariff(String),

    /// Orientation string that is not north/east/south/west
    #[error("Unknown orientation: {0}")]
    UnknownOrientation(String),

    /// Estimator configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Check that a coordinate pair is finite and in range
pub(crate) fn validate_coordinates(lat: f64, lng: f64) -> Result<()> {
    let valid = lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0;
    if !valid {
        return Err(EnergyError::InvalidCoordinates { lat, lng });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(-33.8688, 151.2093).is_ok());
        assert!(validate_coordinates(90.0, -180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }
}
