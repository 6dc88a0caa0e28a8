//! matchkit - completion match engine
//!
//! Prints the candidates matching a typed prefix, or runs a line editor whose
//! Tab completion goes through the match pipeline.
//!
//! # Usage
//!
//! ```bash
//! # One-shot completion from a candidate list
//! ls -p | matchkit complete re
//!
//! # Interactive mode
//! matchkit interactive --file commands.txt
//! ```

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use matchkit::cli::CliInterface;
use matchkit::error::Result;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Run the selected subcommand
fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);
    cli.run()
}

/// Initialize logging system based on verbosity level
///
/// `RUST_LOG` directives take precedence over the configured level.
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(level, directives.as_deref());

    // Logs go to stderr so completion output stays clean
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}

/// Filter from `RUST_LOG`-style directives, falling back to `level`.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}
