//! Catalog Trie - Admin entrypoint.
//!
//! Loads configuration, initializes the logging system and runs one of the
//! administrative subcommands.

use catalog_trie_lib::catalog::replay::{parse_script, replay};
use catalog_trie_lib::catalog::Catalog;
use catalog_trie_lib::config::{self, CatalogConfig, ConfigLoader, LogConfig};
use catalog_trie_lib::error::{
    report_error, set_error_reporter, CatalogError, CatalogResult, ErrorContext,
    TracingErrorReporter,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[clap(name = "catalog_trie", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },

    /// Apply a JSON script of catalog operations and print the result
    Replay {
        /// Path to the JSON script
        #[clap(value_parser)]
        script: PathBuf,
    },
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// so that command output on stdout stays machine readable.
fn init_logging(log: &LogConfig) -> CatalogResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_line_number(true)
        .with_file(true)
        .with_writer(std::io::stderr);

    let result = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    };
    result.map_err(|e| CatalogError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

fn fail(error: CatalogError, component: &str) -> ! {
    report_error(ErrorContext::new(error, component));
    process::exit(1);
}

/// Main entry point for the application.
fn main() -> CatalogResult<()> {
    let args = Args::parse();

    let loader = ConfigLoader::new(args.config.as_deref(), config::ENV_PREFIX);
    let loaded = loader.load();

    // fall back to default logging so that a broken config is still reported
    let log = loaded.as_ref().map(|c| c.log.clone()).unwrap_or_default();
    init_logging(&log)?;
    set_error_reporter(Arc::new(TracingErrorReporter::new()));

    match args.command {
        Command::Validate => {
            info!("Validating configuration");
            match loaded {
                Ok(_) => {
                    info!("Configuration validated successfully");
                    Ok(())
                }
                Err(e) => fail(e.into(), "config"),
            }
        }
        Command::GenConfig { output } => {
            info!("Generating default configuration");
            let default_config = CatalogConfig::default();

            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml = toml::to_string_pretty(&default_config)
                .map_err(|e| CatalogError::Custom(format!("Failed to serialize config: {e}")))?;
            std::fs::write(&output, toml)?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
        Command::Replay { script } => {
            let config = match loaded {
                Ok(config) => config,
                Err(e) => fail(e.into(), "config"),
            };
            config::init_global_config(config.clone());

            let ops = parse_script(&std::fs::read_to_string(&script)?)?;
            info!(operations = ops.len(), script = ?script, "Replaying script");

            let catalog = Catalog::with_settings(&config.catalog);
            let report = match replay(&catalog, &ops) {
                Ok(report) => report,
                Err(e) => fail(e, "replay"),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
