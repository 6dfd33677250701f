//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SolarSite CLI - Merge site data sources and run quick energy estimates.
#[derive(Debug, Parser)]
#[command(name = "solarsite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SOLARSITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge source records from JSON into one site record
    Arbitrate(ArbitrateArgs),

    /// Estimate roof shading for a location
    Shading(ShadingArgs),

    /// Plane-of-array irradiance from NASA POWER data
    Poa(PoaArgs),

    /// Fallback solar or battery return estimate
    Roi(RoiArgs),

    /// Plan the cheapest battery charge/discharge schedule
    Dispatch(DispatchArgs),

    /// Show or initialise configuration
    Config(ConfigArgs),

    /// Enter an interactive collection session
    Session,
}

/// Arguments for the arbitrate command.
#[derive(Debug, Parser)]
pub struct ArbitrateArgs {
    /// JSON file containing an array of source records
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the JSON array from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Show which source won each field and why
    #[arg(short, long)]
    pub explain: bool,
}

/// Arguments for the shading command.
#[derive(Debug, Parser)]
pub struct ShadingArgs {
    /// Latitude in decimal degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(allow_hyphen_values = true)]
    pub lng: f64,

    /// Roof orientation
    #[arg(short, long, value_enum, default_value = "north")]
    pub orientation: OrientationArg,

    /// Satellite zoom level
    #[arg(short, long, default_value = "20")]
    pub zoom: u8,

    /// Skip the random jitter
    #[arg(long)]
    pub deterministic: bool,

    /// Print the estimate as a map-analysis source record
    #[arg(long)]
    pub as_source: bool,
}

/// Arguments for the poa command.
#[derive(Debug, Parser)]
pub struct PoaArgs {
    /// Latitude in decimal degrees
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(allow_hyphen_values = true)]
    pub lng: f64,

    /// First day (YYYY-MM-DD, UTC)
    #[arg(short, long)]
    pub start: NaiveDate,

    /// Last day, inclusive (YYYY-MM-DD, UTC)
    #[arg(short, long)]
    pub end: NaiveDate,

    /// Panel tilt from horizontal, degrees
    #[arg(short, long, default_value = "20")]
    pub tilt: f64,

    /// Panel azimuth clockwise from north, degrees
    #[arg(short, long, default_value = "0")]
    pub azimuth: f64,

    /// Ground reflectance
    #[arg(long, default_value = "0.2")]
    pub albedo: f64,

    /// Only print daily totals
    #[arg(long)]
    pub daily: bool,
}

/// Arguments for the roi command.
#[derive(Debug, Parser)]
pub struct RoiArgs {
    /// JSON file with usage, tariff, and shading inputs
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the JSON input from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Estimate battery returns instead of solar
    #[arg(short, long)]
    pub battery: bool,
}

/// Arguments for the dispatch command.
#[derive(Debug, Parser)]
pub struct DispatchArgs {
    /// JSON file with prices, pv, load, and constraints
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Read the JSON input from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Print the QUBO coefficients instead of a plan
    #[arg(long)]
    pub qubo: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Roof orientation argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OrientationArg {
    /// North-facing
    North,
    /// East-facing
    East,
    /// South-facing
    South,
    /// West-facing
    West,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<OrientationArg> for solarsite_energy::Orientation {
    fn from(orientation: OrientationArg) -> Self {
        match orientation {
            OrientationArg::North => solarsite_energy::Orientation::North,
            OrientationArg::East => solarsite_energy::Orientation::East,
            OrientationArg::South => solarsite_energy::Orientation::South,
            OrientationArg::West => solarsite_energy::Orientation::West,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["solarsite"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_arbitrate_command() {
        let cli = Cli::parse_from(["solarsite", "arbitrate", "--file", "sources.json", "--explain"]);
        match cli.command {
            Some(Command::Arbitrate(args)) => {
                assert_eq!(args.file, Some(PathBuf::from("sources.json")));
                assert!(args.explain);
                assert!(!args.stdin);
            }
            _ => panic!("Expected Arbitrate command"),
        }
    }

    #[test]
    fn test_shading_negative_latitude() {
        let cli = Cli::parse_from(["solarsite", "shading", "-33.8688", "151.2093", "-o", "west"]);
        match cli.command {
            Some(Command::Shading(args)) => {
                assert_eq!(args.lat, -33.8688);
                assert_eq!(args.zoom, 20);
                assert!(matches!(args.orientation, OrientationArg::West));
            }
            _ => panic!("Expected Shading command"),
        }
    }

    #[test]
    fn test_dispatch_command() {
        let cli = Cli::parse_from(["solarsite", "dispatch", "--stdin", "--qubo"]);
        match cli.command {
            Some(Command::Dispatch(args)) => {
                assert!(args.stdin);
                assert!(args.qubo);
                assert!(args.file.is_none());
            }
            _ => panic!("Expected Dispatch command"),
        }
    }

    #[test]
    fn test_poa_dates() {
        let cli = Cli::parse_from([
            "solarsite", "poa", "-31.95", "115.86", "--start", "2024-01-01", "--end", "2024-01-07",
        ]);
        match cli.command {
            Some(Command::Poa(args)) => {
                assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(args.tilt, 20.0);
                assert_eq!(args.albedo, 0.2);
            }
            _ => panic!("Expected Poa command"),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Cli::try_parse_from(["solarsite", "poa", "0", "0", "--start", "01/01/2024", "--end", "2024-01-02"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["solarsite", "config", "show", "--format", "json", "--verbose"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.verbose);
    }

    #[test]
    fn test_orientation_conversion() {
        let orientation: solarsite_energy::Orientation = OrientationArg::South.into();
        assert_eq!(orientation, solarsite_energy::Orientation::South);
    }
}
