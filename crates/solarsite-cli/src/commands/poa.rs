//! POA command implementation.

use crate::cli::PoaArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use solarsite_energy::compute_poa;
use solarsite_power::{PowerCache, PowerClient};
use tracing::debug;

/// Execute the poa command.
pub async fn execute_poa(args: PoaArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let client = PowerClient::new(&config.power)?;
    let cache = PowerCache::new(&config.power.cache_dir);

    let hourly = cache
        .cached_hourly(&client, args.lat, args.lng, args.start, args.end)
        .await?;
    debug!(hours = hourly.len(), "Loaded hourly irradiance");

    let series = compute_poa(&hourly, args.lat, args.lng, args.tilt, args.azimuth, args.albedo)?;
    println!("{}", formatter.format_poa(&series, args.daily)?);
    Ok(())
}
