//! Arbitrate command implementation.

use super::read_input;
use crate::cli::ArbitrateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::input::parse_sources;
use crate::output::Formatter;
use solarsite_domain::{CollectionFlow, MergedRecord};
use tracing::{debug, info};

/// Execute the arbitrate command.
pub fn execute_arbitrate(args: ArbitrateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let json = read_input(args.file.as_deref(), args.stdin)?;
    let output = arbitrate_json(&json, config, formatter, args.explain)?;
    println!("{}", output);
    Ok(())
}

/// Run the collection flow over JSON sources and format the result.
pub fn arbitrate_json(json: &str, config: &Config, formatter: &Formatter, explain: bool) -> Result<String> {
    let records = parse_sources(json, &config.confidence)?;

    let mut flow = CollectionFlow::new();
    for record in records {
        if let Some(replaced) = flow.supply(record)? {
            debug!(kind = %replaced.kind(), name = replaced.name(), "Replaced earlier source of the same kind");
        }
    }

    let arbitration = flow
        .arbitrate(&mut |record: &MergedRecord| {
            info!(fields = record.len(), "Merged record ready");
        })?
        .clone();

    formatter.format_arbitration(&arbitration, flow.sources().as_slice(), explain)
}
