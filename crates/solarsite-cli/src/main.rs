//! SolarSite CLI - Command-line interface for solar site assessment.

use clap::Parser;
use solarsite_cli::commands;
use solarsite_cli::repl;
use solarsite_cli::{Cli, Command, Config, Formatter};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `SOLARSITE_LOG` (default: warn, or debug with --verbose).
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SOLARSITE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> solarsite_cli::Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)?;
    debug!(path = %config_path.display(), "Loaded configuration");

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        None | Some(Command::Session) => {
            repl::run_repl(&config, &formatter)?;
        }
        Some(Command::Arbitrate(args)) => {
            commands::execute_arbitrate(args, &config, &formatter)?;
        }
        Some(Command::Shading(args)) => {
            commands::execute_shading(args, &config, &formatter)?;
        }
        Some(Command::Poa(args)) => {
            commands::execute_poa(args, &config, &formatter).await?;
        }
        Some(Command::Roi(args)) => {
            commands::execute_roi(args, &formatter)?;
        }
        Some(Command::Dispatch(args)) => {
            commands::execute_dispatch(args, &formatter)?;
        }
        Some(Command::Config(args)) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
    }

    Ok(())
}
