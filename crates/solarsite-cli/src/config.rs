//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use solarsite_domain::{Confidence, SourceKind};
use solarsite_energy::EstimatorConfig;
use solarsite_power::PowerConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Default confidence per source kind
    #[serde(default)]
    pub confidence: ConfidenceTable,

    /// Shading estimator settings
    #[serde(default)]
    pub shading: EstimatorConfig,

    /// NASA POWER client settings
    #[serde(default)]
    pub power: PowerConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Session history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Confidence assigned to sources that do not state one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTable {
    /// Electricity bill OCR
    #[serde(default = "default_bill")]
    pub bill: f64,

    /// Installer proposal OCR
    #[serde(default = "default_proposal")]
    pub proposal: f64,

    /// Map/satellite analysis
    #[serde(default = "default_maps")]
    pub maps: f64,

    /// Manual entry
    #[serde(default = "default_manual")]
    pub manual: f64,
}

impl ConfidenceTable {
    /// Configured confidence for a kind.
    pub fn confidence_for(&self, kind: SourceKind) -> Result<Confidence> {
        let value = match kind {
            SourceKind::Bill => self.bill,
            SourceKind::Proposal => self.proposal,
            SourceKind::Maps => self.maps,
            SourceKind::Manual => self.manual,
        };
        Confidence::new(value).map_err(|e| CliError::Config(format!("confidence.{}: {}", kind, e)))
    }
}

impl Default for ConfidenceTable {
    fn default() -> Self {
        Self {
            bill: default_bill(),
            proposal: default_proposal(),
            maps: default_maps(),
            manual: default_manual(),
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".solarsite").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from file, or the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        for kind in SourceKind::ALL {
            self.confidence.confidence_for(kind)?;
        }
        self.shading
            .validate()
            .map_err(|e| CliError::Config(format!("shading: {}", e)))?;
        if self.power.timeout_secs == 0 {
            return Err(CliError::Config("power.timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: 1000,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}

fn default_bill() -> f64 {
    SourceKind::Bill.default_confidence().value()
}

fn default_proposal() -> f64 {
    SourceKind::Proposal.default_confidence().value()
}

fn default_maps() -> f64 {
    SourceKind::Maps.default_confidence().value()
}

fn default_manual() -> f64 {
    SourceKind::Manual.default_confidence().value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.confidence.maps, 0.9);
        assert_eq!(config.shading.max_shading, 0.35);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            format = "json"

            [confidence]
            bill = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.confidence.bill, 0.7);
        assert_eq!(config.confidence.manual, 0.95);
        assert_eq!(config.power.timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.history_size = 50;
        config.shading = EstimatorConfig::deterministic();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[confidence]\nmaps = 1.5\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_confidence_for_kind() {
        let table = ConfidenceTable::default();
        assert_eq!(table.confidence_for(SourceKind::Proposal).unwrap().value(), 0.85);
    }
}
