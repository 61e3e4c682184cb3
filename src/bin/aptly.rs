//! aptly CLI Binary
//!
//! Sets up logging, builds the execution context, runs one command and shuts the
//! context down before exiting.

use aptly::cli::Cli;
use aptly::config::{config_locations, find_config};
use aptly::context::Context;
use aptly::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[cfg(feature = "debug")]
#[global_allocator]
static ALLOCATOR: aptly::debug::CountingAllocator = aptly::debug::CountingAllocator;

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    let profiler = match init_logging(Some(&logging_config)) {
        Ok(slot) => slot,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("aptly starting");

    let mut context = match Context::new(cli.global.context_flags(), Some(&profiler)) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing context: {}", e);
            eprintln!("{}", aptly::cli::map_error(&e));
            process::exit(e.exit_code());
        }
    };

    let result = aptly::cli::run(&mut context, &cli.command);
    let shutdown = context.shutdown();

    let code = match result {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", aptly::cli::map_error(&e));
            e.exit_code()
        }
    };

    if let Err(e) = shutdown {
        eprintln!("{}", aptly::cli::map_error(&e));
        if code == 0 {
            process::exit(e.exit_code());
        }
    }
    process::exit(code);
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let locations = match &cli.global.config {
        Some(path) => vec![path.clone()],
        None => config_locations().unwrap_or_default(),
    };
    logging_config_from(cli, &locations)
}

/// Logging settings from the file the context will resolve. A file that fails to
/// load leaves the defaults in place; later candidates are not consulted.
fn logging_config_from(cli: &Cli, locations: &[PathBuf]) -> LoggingConfig {
    let mut config = match find_config(locations) {
        Ok(Some((_, file))) => file.logging,
        Ok(None) | Err(_) => LoggingConfig::default(),
    };

    if cli.global.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.global.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.global.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.global.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.global.log_file {
        config.file = Some(file.clone());
    }

    config
}
