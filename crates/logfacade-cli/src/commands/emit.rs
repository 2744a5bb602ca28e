//! Emit commands
//!
//! Usage: logfacade emit [--level <LEVEL>] [--count <N>] <MESSAGE>
//!        logfacade fatal <MESSAGE>

use clap::Args;
use logfacade_logging::{debugf, errorf, fatalf, infof, sync, warnf, Level};

#[derive(Debug, Args)]
pub struct EmitArgs {
    /// Message to log
    pub message: String,

    /// Level to log at (debug, info, warn, error, fatal)
    #[arg(short, long, default_value = "info")]
    pub level: Level,

    /// Number of times to log the message from the same call site
    #[arg(short, long, default_value_t = 1)]
    pub count: u64,
}

#[derive(Debug, Args)]
pub struct FatalArgs {
    /// Message to log before aborting
    pub message: String,
}

/// Execute emit command
pub fn execute(args: EmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    for i in 0..args.count {
        let seq = i + 1;
        match args.level {
            Level::Debug => debugf!("{} ({}/{})", args.message, seq, args.count),
            Level::Info => infof!("{} ({}/{})", args.message, seq, args.count),
            Level::Warn => warnf!("{} ({}/{})", args.message, seq, args.count),
            Level::Error => errorf!("{} ({}/{})", args.message, seq, args.count),
            Level::Fatal => fatalf!("{} ({}/{})", args.message, seq, args.count),
        }
    }

    sync()?;
    Ok(())
}

/// Execute fatal command
pub fn execute_fatal(args: FatalArgs) -> Result<(), Box<dyn std::error::Error>> {
    fatalf!("{}", args.message)
}
