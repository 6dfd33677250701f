//! SolarSite CLI library.
//!
//! Configuration, argument parsing, source input, output formatting, and the
//! interactive session behind the `solarsite` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
