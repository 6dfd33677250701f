//! Domain error type

use thiserror::Error;

/// Errors raised when constructing or transitioning domain values
///
/// Arbitration itself never fails; these cover invalid inputs at the edges.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Confidence outside [0, 1] (or NaN)
    #[error("Confidence must be in [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),

    /// Non-finite value supplied for a numeric field
    #[error("Non-finite value for {field}: {value}")]
    NonFinite {
        /// Wire name of the field
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Field name that is not part of the fixed field set
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Source kind that is not one of bill/proposal/maps/manual
    #[error("Unknown source kind: {0}")]
    UnknownKind(String),

    /// Value of the wrong type for a field (e.g. text for latitude)
    #[error("Field {field} expects a {expected} value")]
    FieldType {
        /// Wire name of the field
        field: &'static str,
        /// Expected value type
        expected: &'static str,
    },

    /// Collection flow transition that the state machine does not allow
    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        /// State the flow was in
        from: &'static str,
        /// Attempted operation
        action: &'static str,
    },
}
