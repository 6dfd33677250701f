//! Command implementations.

pub mod arbitrate;
pub mod config;
pub mod dispatch;
pub mod poa;
pub mod roi;
pub mod shading;

pub use self::arbitrate::execute_arbitrate;
pub use self::config::execute_config;
pub use self::dispatch::execute_dispatch;
pub use self::poa::execute_poa;
pub use self::roi::execute_roi;
pub use self::shading::execute_shading;
pub(crate) use self::shading::fetch as fetch_shading;

use crate::error::{CliError, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read command input from a file or stdin.
pub(crate) fn read_input(file: Option<&Path>, stdin: bool) -> Result<String> {
    if stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else if let Some(path) = file {
        Ok(fs::read_to_string(path)?)
    } else {
        Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ))
    }
}
