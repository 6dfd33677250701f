//! Source confidence score

use crate::DomainError;
use std::fmt;

/// Confidence score in [0.0, 1.0] attached to a source record
///
/// Fixed per source kind by default (see [`crate::SourceKind::default_confidence`]).
/// Compared by value; NaN is rejected at construction so the ordering is total.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    /// Lowest possible confidence
    pub const ZERO: Confidence = Confidence(0.0);

    /// Highest possible confidence
    pub const FULL: Confidence = Confidence(1.0);

    /// Create a confidence score
    ///
    /// # Errors
    /// Returns [`DomainError::ConfidenceOutOfRange`] for values outside [0, 1] or NaN
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(DomainError::ConfidenceOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Create a confidence score from a value known to be in range
    ///
    /// Only for compile-time constants; the value must already be in [0, 1].
    pub(crate) const fn from_const(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Return the larger of two scores
    pub fn max(self, other: Confidence) -> Confidence {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Confidence {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_creation() {
        let c = Confidence::new(0.8).unwrap();
        assert_eq!(c.value(), 0.8);
    }

    #[test]
    fn test_bounds_inclusive() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(1.0).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            Confidence::new(1.01),
            Err(DomainError::ConfidenceOutOfRange(1.01))
        );
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(f64::NAN).is_err());
    }

    #[test]
    fn test_max() {
        let a = Confidence::new(0.7).unwrap();
        let b = Confidence::new(0.9).unwrap();
        assert_eq!(a.max(b), b);
        assert_eq!(b.max(a), b);
    }

    #[test]
    fn test_display() {
        assert_eq!(Confidence::new(0.85).unwrap().to_string(), "0.85");
    }
}
