// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};

use crate::app_config::{Config, LogLevel};
use crate::app_controller::Controller;
use crate::translation::PrecisionMode;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod providers;
mod translation;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a directory of game-content JSON documents
    Translate(TranslateArgs),

    /// Generate shell completions for statloc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input folder of JSON documents, e.g. data/monsters
    #[arg(long = "in", value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Output folder for translated documents, e.g. data/monsters_de
    #[arg(long = "out", value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Target language code
    #[arg(short, long, default_value = "DE")]
    target: String,

    /// Safety margin (chars). Stop before the quota limit by this much
    #[arg(long, default_value_t = 15_000)]
    margin: u64,

    /// Cache file for translated strings
    #[arg(long, default_value = "translation_cache.json")]
    cache: PathBuf,

    /// State/checkpoint file
    #[arg(long, default_value = "translation_state.json")]
    state: PathBuf,

    /// Persist cache/state every N translated strings
    #[arg(long, default_value_t = 50)]
    save_every: u64,

    /// Overwrite already translated output files
    #[arg(short, long)]
    overwrite: bool,

    /// Do not translate any 'name' fields
    #[arg(long)]
    no_translate_names: bool,

    /// Use exact SI conversions instead of game-friendly ones
    #[arg(long)]
    exact_units: bool,

    /// Glossary normalization JSON file
    #[arg(long, default_value = "glossary_de.json")]
    glossary: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// statloc - Stat-block Localization
///
/// Translates game-content JSON records into another language via DeepL,
/// protecting game-mechanics tokens, converting imperial units to metric,
/// and never spending quota on the same text twice.
#[derive(Parser, Debug)]
#[command(name = "statloc")]
#[command(version)]
#[command(about = "Game-content translation tool with budget-aware caching")]
#[command(
    long_about = "statloc walks a directory of game-content JSON documents and rewrites their
translatable text fields into a target language via the DeepL API.

EXAMPLES:
    statloc translate --in data/monsters --out data/monsters_de
    statloc translate --in data/spells --out data/spells_de --exact-units
    statloc translate --in data/monsters --out data/monsters_de --no-translate-names
    statloc completions bash > statloc.bash

CREDENTIALS:
    The DeepL credential is read from the DEEPL_AUTH_KEY environment
    variable. Runs refuse to start without it."
)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[0m",
            Level::Debug => "\x1B[2m",
            Level::Trace => "\x1B[2m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} [{}] {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn config_from_args(args: &TranslateArgs) -> Config {
    let mut config = Config::new(args.input_dir.clone(), args.output_dir.clone());
    config.target_language = args.target.clone();
    config.safety_margin = args.margin;
    config.cache_path = args.cache.clone();
    config.state_path = args.state.clone();
    config.save_every = args.save_every;
    config.overwrite = args.overwrite;
    config.translate_names = !args.no_translate_names;
    config.precision = if args.exact_units {
        PrecisionMode::Exact
    } else {
        PrecisionMode::GameFriendly
    };
    config.glossary_path = args.glossary.clone();
    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    match options.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => {
            let config = config_from_args(&args);
            if let Err(err) = CustomLogger::init(config.log_level.to_level_filter()) {
                eprintln!("Failed to initialize logger: {}", err);
            }

            let controller = Controller::with_config(config)?;
            match controller.run().await {
                Ok(summary) => {
                    info!(
                        "Run finished: {} output files, ~{} chars of budget left",
                        summary.output_files.len(),
                        summary.budget_remaining
                    );
                    Ok(())
                }
                Err(err) => {
                    error!("Run failed: {}", err);
                    Err(err)
                }
            }
        }
    }
}
