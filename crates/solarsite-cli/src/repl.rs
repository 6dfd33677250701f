//! Interactive collection session.
//!
//! Walks one site through `collecting -> arbitrating -> done`. Sources are
//! added from JSON files, typed in as manual entries, or produced by the
//! shading estimator. Once arbitrated the session only accepts `reset`.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::commands::fetch_shading;
use crate::input::{parse_sources, ManualEntry};
use crate::output::Formatter;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use solarsite_domain::{CollectionFlow, FlowState, MergedRecord, SiteField, SourceKind, SourceRecord};
use solarsite_domain::traits::SourceAdapter;
use solarsite_energy::{Orientation, RandomJitter, ShadingAdapter, ShadingEstimator, ShadingRequest};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Run the interactive session.
pub fn run_repl(config: &Config, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.info("SolarSite session - Type 'help' for commands, 'exit' to quit"));
    println!();

    let mut editor = DefaultEditor::new().map_err(|e| CliError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Failed to initialize editor: {}", e),
    )))?;
    if let Err(e) = editor.set_max_history_size(config.settings.history_size) {
        warn!(error = %e, "Could not set history size");
    }

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut session = Session::new(config, formatter);

    loop {
        let prompt = format!("solarsite ({})> ", session.state().as_str());

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(cmd) => match session.execute(cmd) {
                        Ok(output) if !output.is_empty() => println!("{}", output),
                        Ok(_) => {}
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// Session command.
#[derive(Debug, PartialEq)]
pub enum ReplCommand {
    /// Leave the session
    Exit,
    /// Print the command list
    Help,
    /// Load source records from a JSON file
    Add(PathBuf),
    /// Set a field on the manual-entry source
    Set(SiteField, String),
    /// Estimate shading and supply it as the map-analysis source
    Shading {
        /// Latitude
        lat: f64,
        /// Longitude
        lng: f64,
        /// Roof orientation
        orientation: Orientation,
    },
    /// List collected sources
    List,
    /// Withdraw the source of a kind
    Drop(SourceKind),
    /// Merge the collected sources
    Arbitrate {
        /// Show per-field provenance
        explain: bool,
    },
    /// Show the flow state
    Status,
    /// Discard everything and start collecting again
    Reset,
}

/// Parse a session command line.
pub fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.is_empty() {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    }

    match parts[0] {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "add" => match parts.get(1) {
            Some(path) => Ok(ReplCommand::Add(PathBuf::from(path))),
            None => Err(CliError::InvalidInput("Usage: add <file>".to_string())),
        },
        "set" => {
            if parts.len() < 3 {
                return Err(CliError::InvalidInput("Usage: set <field> <value>".to_string()));
            }
            let field: SiteField = parts[1].parse()?;
            Ok(ReplCommand::Set(field, parts[2..].join(" ")))
        }
        "shading" => parse_shading_command(&parts[1..]),
        "list" | "ls" => Ok(ReplCommand::List),
        "drop" => match parts.get(1) {
            Some(kind) => Ok(ReplCommand::Drop(kind.parse()?)),
            None => Err(CliError::InvalidInput("Usage: drop <kind>".to_string())),
        },
        "arbitrate" | "merge" => Ok(ReplCommand::Arbitrate {
            explain: parts.get(1).is_some_and(|arg| *arg == "explain" || *arg == "-e"),
        }),
        "status" => Ok(ReplCommand::Status),
        "reset" => Ok(ReplCommand::Reset),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            parts[0]
        ))),
    }
}

fn parse_shading_command(args: &[&str]) -> Result<ReplCommand> {
    let usage = || CliError::InvalidInput("Usage: shading <lat> <lng> [north|east|south|west]".to_string());
    if args.len() < 2 {
        return Err(usage());
    }
    let lat: f64 = args[0].parse().map_err(|_| usage())?;
    let lng: f64 = args[1].parse().map_err(|_| usage())?;
    let orientation = match args.get(2) {
        Some(s) => s.parse()?,
        None => Orientation::North,
    };
    Ok(ReplCommand::Shading { lat, lng, orientation })
}

/// One site's collection flow plus the settings it runs with.
pub struct Session<'a> {
    flow: CollectionFlow,
    config: &'a Config,
    formatter: &'a Formatter,
}

impl<'a> Session<'a> {
    /// Start a session in the collecting state.
    pub fn new(config: &'a Config, formatter: &'a Formatter) -> Self {
        Self {
            flow: CollectionFlow::new(),
            config,
            formatter,
        }
    }

    /// Current flow state.
    pub fn state(&self) -> FlowState {
        self.flow.state()
    }

    /// The underlying flow.
    pub fn flow(&self) -> &CollectionFlow {
        &self.flow
    }

    /// Execute a command and return its output.
    pub fn execute(&mut self, cmd: ReplCommand) -> Result<String> {
        match cmd {
            ReplCommand::Exit | ReplCommand::Help => Ok(String::new()),
            ReplCommand::Add(path) => self.add_file(&path),
            ReplCommand::Set(field, value) => self.set_manual(field, &value),
            ReplCommand::Shading { lat, lng, orientation } => self.add_shading(lat, lng, orientation),
            ReplCommand::List => self.formatter.format_sources(self.flow.sources()),
            ReplCommand::Drop(kind) => match self.flow.withdraw(kind)? {
                Some(record) => Ok(self.formatter.success(&format!("Dropped {}", record.name()))),
                None => Ok(self.formatter.warning(&format!("No {} source collected", kind))),
            },
            ReplCommand::Arbitrate { explain } => self.arbitrate(explain),
            ReplCommand::Status => Ok(self.formatter.info(&format!(
                "State: {}, {} source(s)",
                self.flow.state().as_str(),
                self.flow.sources().len()
            ))),
            ReplCommand::Reset => {
                self.flow.reset();
                Ok(self.formatter.success("Session reset"))
            }
        }
    }

    fn supply(&mut self, record: SourceRecord) -> Result<String> {
        let name = record.name().to_string();
        let message = match self.flow.supply(record)? {
            Some(replaced) => format!("Replaced {} with {}", replaced.name(), name),
            None => format!("Added {}", name),
        };
        Ok(self.formatter.success(&message))
    }

    fn add_file(&mut self, path: &std::path::Path) -> Result<String> {
        let json = fs::read_to_string(path)?;
        let records = parse_sources(&json, &self.config.confidence)?;
        if records.is_empty() {
            warn!(path = %path.display(), "Source file holds no records");
            return Ok(self.formatter.warning(&format!("No sources in {}", path.display())));
        }

        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            messages.push(self.supply(record)?);
        }
        Ok(messages.join("\n"))
    }

    fn set_manual(&mut self, field: SiteField, value: &str) -> Result<String> {
        let mut fields = self
            .flow
            .sources()
            .get(SourceKind::Manual)
            .map(|record| record.fields().clone())
            .unwrap_or_default();
        let confidence = self.config.confidence.confidence_for(SourceKind::Manual)?;
        let mut entry = ManualEntry::new(fields, confidence);
        entry.set(field, value)?;

        let record = entry.fetch()?;
        debug!(field = field.as_str(), "Manual entry updated");
        self.supply(record)
    }

    fn add_shading(&mut self, lat: f64, lng: f64, orientation: Orientation) -> Result<String> {
        let estimator = ShadingEstimator::new(self.config.shading.clone());
        let request = ShadingRequest::new(lat, lng, orientation);
        let confidence = self.config.confidence.confidence_for(SourceKind::Maps)?;
        let (estimate, record) =
            fetch_shading(ShadingAdapter::new(estimator, request, RandomJitter).with_confidence(confidence))?;

        let added = self.supply(record)?;
        let summary = self.formatter.info(&format!(
            "Shading {:.1}% ({} region, {})",
            estimate.shading * 100.0,
            estimate.bucket.as_str(),
            orientation
        ));
        Ok(format!("{}\n{}", added, summary))
    }

    fn arbitrate(&mut self, explain: bool) -> Result<String> {
        let formatter = self.formatter;
        let mut rendered = None;
        let arbitration = self
            .flow
            .arbitrate(&mut |record: &MergedRecord| {
                rendered = Some(formatter.format_merged(record));
            })?
            .clone();

        if explain {
            return formatter.format_arbitration(&arbitration, self.flow.sources().as_slice(), true);
        }
        Ok(rendered.transpose()?.unwrap_or_default())
    }
}

fn get_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    let solarsite_dir = home.join(".solarsite");
    fs::create_dir_all(&solarsite_dir)?;
    Ok(solarsite_dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  add <file>                      - Add source records from a JSON file");
    println!("  set <field> <value>             - Set a field on the manual entry");
    println!("    fields: address, postcode, roofTilt, roofAzimuth,");
    println!("            shadingFactor, latitude, longitude");
    println!("  shading <lat> <lng> [dir]       - Estimate shading as the map source");
    println!("  list, ls                        - List collected sources");
    println!("  drop <kind>                     - Drop the bill|proposal|maps|manual source");
    println!("  arbitrate [explain]             - Merge sources (ends collection)");
    println!("  status                          - Show session state");
    println!("  reset                           - Discard sources and start again");
    println!("  help, ?                         - Show this help");
    println!("  exit, quit, q                   - Exit session");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use solarsite_domain::DomainError;
    use tempfile::TempDir;

    fn quiet() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_repl_command("exit").unwrap(), ReplCommand::Exit);
        assert_eq!(
            parse_repl_command("set address 12 Harbour Rd").unwrap(),
            ReplCommand::Set(SiteField::Address, "12 Harbour Rd".to_string())
        );
        assert_eq!(
            parse_repl_command("drop Maps").unwrap(),
            ReplCommand::Drop(SourceKind::Maps)
        );
        assert_eq!(
            parse_repl_command("arbitrate explain").unwrap(),
            ReplCommand::Arbitrate { explain: true }
        );
        assert_eq!(
            parse_repl_command("shading -33.87 151.21 west").unwrap(),
            ReplCommand::Shading {
                lat: -33.87,
                lng: 151.21,
                orientation: Orientation::West
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_repl_command("set roofColour red").is_err());
        assert!(parse_repl_command("set latitude").is_err());
        assert!(parse_repl_command("drop drone").is_err());
        assert!(parse_repl_command("shading north").is_err());
        assert!(parse_repl_command("frobnicate").is_err());
    }

    #[test]
    fn test_manual_entries_accumulate() {
        let config = Config::default();
        let formatter = quiet();
        let mut session = Session::new(&config, &formatter);

        session.execute(ReplCommand::Set(SiteField::Postcode, "2000".into())).unwrap();
        session.execute(ReplCommand::Set(SiteField::RoofTilt, "20".into())).unwrap();

        let sources = session.flow().sources();
        assert_eq!(sources.len(), 1);
        let manual = sources.get(SourceKind::Manual).unwrap();
        assert_eq!(manual.fields().postcode(), Some("2000"));
        assert_eq!(manual.fields().roof_tilt(), Some(20.0));
        assert_eq!(manual.confidence().value(), 0.95);
    }

    #[test]
    fn test_full_session_flow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"[
                {"kind": "bill", "fields": {"address": "12 Harbour Rd", "latitude": -33.80}},
                {"kind": "proposal", "fields": {"roofTilt": 22}}
            ]"#,
        )
        .unwrap();

        let config = Config::default();
        let formatter = quiet();
        let mut session = Session::new(&config, &formatter);

        session.execute(ReplCommand::Add(path)).unwrap();
        session
            .execute(ReplCommand::Shading {
                lat: -33.8688,
                lng: 151.2093,
                orientation: Orientation::North,
            })
            .unwrap();
        session.execute(ReplCommand::Set(SiteField::RoofTilt, "30".into())).unwrap();

        let output = session.execute(ReplCommand::Arbitrate { explain: false }).unwrap();
        assert!(output.contains("address=12 Harbour Rd"));
        assert!(output.contains("roofTilt=22"));
        assert!(output.contains("latitude=-33.8688"));
        assert_eq!(session.state(), FlowState::Done);

        // Done is terminal until reset
        let result = session.execute(ReplCommand::Set(SiteField::Postcode, "2000".into()));
        assert!(matches!(
            result,
            Err(CliError::Domain(DomainError::InvalidTransition { .. }))
        ));
        assert!(session.execute(ReplCommand::Arbitrate { explain: false }).is_err());

        session.execute(ReplCommand::Reset).unwrap();
        assert_eq!(session.state(), FlowState::Collecting);
        assert!(session.flow().sources().is_empty());
    }

    #[test]
    fn test_drop_source() {
        let config = Config::default();
        let formatter = quiet();
        let mut session = Session::new(&config, &formatter);

        session.execute(ReplCommand::Set(SiteField::Postcode, "2000".into())).unwrap();
        let output = session.execute(ReplCommand::Drop(SourceKind::Manual)).unwrap();
        assert!(output.contains("Dropped Manual Entry"));
        assert!(session.flow().sources().is_empty());

        let output = session.execute(ReplCommand::Drop(SourceKind::Bill)).unwrap();
        assert!(output.contains("No bill source"));
    }

    #[test]
    fn test_empty_file_warns_and_keeps_collecting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "[]").unwrap();

        let config = Config::default();
        let formatter = quiet();
        let mut session = Session::new(&config, &formatter);

        let output = session.execute(ReplCommand::Add(path)).unwrap();
        assert!(output.contains("No sources in"));
        assert_eq!(session.state(), FlowState::Collecting);
        assert!(session.flow().sources().is_empty());
    }

    #[test]
    fn test_arbitrate_without_sources_completes() {
        let config = Config::default();
        let formatter = quiet();
        let mut session = Session::new(&config, &formatter);

        let output = session.execute(ReplCommand::Arbitrate { explain: false }).unwrap();
        assert!(output.is_empty());
        assert_eq!(session.state(), FlowState::Done);
        assert!(session.flow().result().unwrap().record.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let config = Config::default();
        let formatter = quiet();
        let mut session = Session::new(&config, &formatter);
        let result = session.execute(ReplCommand::Add(PathBuf::from("/nonexistent/sources.json")));
        assert!(matches!(result, Err(CliError::Io(_))));
        assert_eq!(session.state(), FlowState::Collecting);
    }
}
