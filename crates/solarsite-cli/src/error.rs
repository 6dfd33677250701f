//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Domain error (bad field, kind, confidence, or flow transition)
    #[error("{0}")]
    Domain(#[from] solarsite_domain::DomainError),

    /// Energy estimate error
    #[error("{0}")]
    Energy(#[from] solarsite_energy::EnergyError),

    /// NASA POWER error
    #[error("NASA POWER error: {0}")]
    Power(#[from] solarsite_power::PowerError),
}
