//! Dispatch command implementation.

use super::read_input;
use crate::cli::DispatchArgs;
use crate::error::Result;
use crate::output::Formatter;
use solarsite_energy::{build_qubo, plan_dispatch, DispatchRequest};
use tracing::info;

/// Execute the dispatch command.
pub fn execute_dispatch(args: DispatchArgs, formatter: &Formatter) -> Result<()> {
    let json = read_input(args.file.as_deref(), args.stdin)?;
    println!("{}", dispatch_json(&json, args.qubo, formatter)?);
    Ok(())
}

/// Plan a dispatch request (or build its QUBO) and format the result.
pub fn dispatch_json(json: &str, qubo: bool, formatter: &Formatter) -> Result<String> {
    let request: DispatchRequest = serde_json::from_str(json)?;
    if qubo {
        return formatter.format_qubo(&build_qubo(&request)?);
    }

    let plan = plan_dispatch(&request)?;
    let idle_cost = request.idle_cost();
    info!(hours = plan.schedule.len(), cost = plan.cost, idle_cost, "Dispatch planned");
    formatter.format_dispatch(&plan, idle_cost)
}
