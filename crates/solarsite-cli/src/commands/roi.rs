//! ROI command implementation.

use super::read_input;
use crate::cli::RoiArgs;
use crate::error::Result;
use crate::output::Formatter;
use solarsite_energy::{estimate_battery_roi, estimate_solar_roi, BatteryInput, CommonInput};

/// Execute the roi command.
pub fn execute_roi(args: RoiArgs, formatter: &Formatter) -> Result<()> {
    let json = read_input(args.file.as_deref(), args.stdin)?;
    println!("{}", roi_json(&json, args.battery, formatter)?);
    Ok(())
}

/// Run the fallback estimate over a JSON input and format it.
pub fn roi_json(json: &str, battery: bool, formatter: &Formatter) -> Result<String> {
    if battery {
        let input: BatteryInput = serde_json::from_str(json)?;
        formatter.format_battery(&estimate_battery_roi(&input)?)
    } else {
        let input: CommonInput = serde_json::from_str(json)?;
        formatter.format_roi(&estimate_solar_roi(&input)?)
    }
}
