//! Command-line interface for matchkit
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Dispatch of the `complete`, `interactive`, `config`, `completion` and
//!   `version` subcommands

pub mod candidates;
pub mod completion;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::adapter::MatchAdapter;
use crate::config::{Config, LogLevel};
use crate::error::{ConfigError, Result};
use crate::lookaside::Lookaside;
use crate::matches::{MatchDesc, Matches};
use crate::pipeline::{GeneratorChain, LineState, ListGenerator, MatchPipeline, SortDirs};
use crate::repl::ReplEngine;

/// matchkit - completion match engine
#[derive(Parser, Debug)]
#[command(
    name = "matchkit",
    version,
    about = "Completion match engine: generate, select, sort and describe candidates",
    long_about = "Reads completion candidates, narrows them to those matching a typed
prefix and prints them in display order, or drives an interactive line editor
whose Tab completion runs through the same pipeline."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for matchkit
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the candidates matching a prefix
    Complete {
        /// Prefix typed so far (matched ignoring case)
        #[arg(value_name = "NEEDLE", allow_hyphen_values = true)]
        needle: String,

        /// Candidate file, one `text[<TAB>description]` per line (default: stdin)
        #[arg(short = 'f', long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Print JSON instead of lines
        #[arg(long)]
        json: bool,

        /// Keep candidate order instead of sorting
        #[arg(long)]
        no_sort: bool,

        /// Directory placement (before, with, after)
        #[arg(long, value_name = "PLACEMENT")]
        sort_dirs: Option<String>,
    },

    /// Start a line editor with Tab completion
    Interactive {
        /// Candidate file offered for every word
        #[arg(short = 'f', long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show version information
    Version,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and apply argument overrides
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Run the selected subcommand; no subcommand starts the line editor.
    pub fn run(&self) -> Result<()> {
        match &self.args.command {
            Some(Commands::Complete {
                needle,
                file,
                json,
                no_sort,
                sort_dirs,
            }) => {
                let dirs = self.resolve_sort_dirs(sort_dirs.as_deref())?;
                let items = candidates::load_candidates(file.as_deref())?;
                let adapter = self.complete(needle, items, *no_sort, dirs);
                print!("{}", candidates::render_matches(&adapter, *json)?);
                Ok(())
            }
            Some(Commands::Interactive { file }) => self.run_interactive(file.as_deref()),
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)
            }
            Some(Commands::Completion { shell }) => {
                print!("{}", completion::generate_completion(shell)?);
                Ok(())
            }
            Some(Commands::Version) => {
                self.show_version();
                Ok(())
            }
            None => self.run_interactive(None),
        }
    }

    fn resolve_sort_dirs(&self, value: Option<&str>) -> Result<SortDirs> {
        match value {
            None => Ok(self.config.matching.sort_dirs),
            Some(value) => SortDirs::parse(value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "sort-dirs".to_string(),
                    value: value.to_string(),
                }
                .into()
            }),
        }
    }

    /// Run one completion attempt over a fixed candidate list.
    fn complete(
        &self,
        needle: &str,
        items: Vec<MatchDesc>,
        no_sort: bool,
        dirs: SortDirs,
    ) -> MatchAdapter {
        let mut generator = ListGenerator::new("candidates", items);
        if no_sort || self.config.matching.no_sort {
            generator = generator.no_sort();
        }
        let mut chain = GeneratorChain::new();
        chain.add(Box::new(generator), 0);

        let mut matches = Matches::new(self.config.matching.store_capacity);
        MatchPipeline::new(&mut matches).complete(&LineState::from_word(needle), &chain, dirs);

        let mut adapter = MatchAdapter::new(Lookaside::new());
        adapter.set_owned(matches);
        adapter
    }

    fn run_interactive(&self, file: Option<&Path>) -> Result<()> {
        let items = match file {
            Some(path) => candidates::load_candidates(Some(path))?,
            None => Vec::new(),
        };

        if !self.args.quiet {
            println!("matchkit {} (Tab to complete, Ctrl-D to exit)", env!("CARGO_PKG_VERSION"));
        }

        let mut engine = ReplEngine::new(&self.config, items)?;
        engine.run()?;

        if !self.args.quiet {
            println!("Goodbye!");
        }
        Ok(())
    }

    /// Show version information
    fn show_version(&self) {
        println!("matchkit version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config()?;
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return Ok(());
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();

        match self.config.to_toml() {
            Ok(toml_str) => println!("{}", toml_str),
            Err(e) => {
                eprintln!("Error formatting configuration: {}", e);
                println!("{:#?}", self.config);
            }
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}
