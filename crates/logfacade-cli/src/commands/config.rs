//! Config command
//!
//! Usage: logfacade [--config <FILE>] [--log-file <PATH>] config

use logfacade_logging::current;

/// Print the active configuration
pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let logger = current();
    print!("{}", toml::to_string_pretty(logger.config())?);
    Ok(())
}
