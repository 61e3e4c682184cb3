//! CLI parse: clap types for aptly. No behavior beyond value parsing.

use crate::context::ContextFlags;
use crate::debug::DebugOptions;
use crate::options::DependencyFlags;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// aptly - Debian repository management tool
#[derive(Parser, Debug)]
#[command(name = "aptly")]
#[command(about = "Debian repository management tool")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Location of configuration file (default locations are ~/.aptly.conf, /etc/aptly.conf)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// When processing dependencies, follow Suggests
    #[arg(long, global = true)]
    pub dep_follow_suggests: bool,

    /// When processing dependencies, follow Recommends
    #[arg(long, global = true)]
    pub dep_follow_recommends: bool,

    /// When processing dependencies, follow a & b if dependency is 'a|b'
    #[arg(long, global = true)]
    pub dep_follow_all_variants: bool,

    /// When processing dependencies, follow from binary to Source packages
    #[arg(long, global = true)]
    pub dep_follow_source: bool,

    /// List of architectures to consider during (comma-separated), default to all available
    #[arg(long, global = true)]
    pub architectures: Option<String>,

    /// Write CPU profile to file
    #[arg(long, global = true, value_name = "FILE")]
    pub cpuprofile: Option<PathBuf>,

    /// Write memory profile to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub memprofile: Option<PathBuf>,

    /// Write memory stats periodically to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub memstats: Option<PathBuf>,

    /// Memory stats dump interval (e.g. 100ms, 2s)
    #[arg(long, global = true, value_parser = parse_duration, default_value = "100ms")]
    pub meminterval: Duration,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalArgs {
    /// Values the execution context consumes.
    pub fn context_flags(&self) -> ContextFlags {
        ContextFlags {
            config: self.config.clone(),
            dependency: DependencyFlags {
                follow_suggests: self.dep_follow_suggests,
                follow_recommends: self.dep_follow_recommends,
                follow_all_variants: self.dep_follow_all_variants,
                follow_source: self.dep_follow_source,
            },
            architectures: self.architectures.clone(),
            debug: DebugOptions {
                cpu_profile: self.cpuprofile.clone(),
                mem_profile: self.memprofile.clone(),
                mem_stats: self.memstats.clone(),
                mem_interval: Some(self.meminterval),
            },
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage aptly configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage local package repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommands,
    },
    /// Display version
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show current aptly config
    Show,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RepoCommands {
    /// Create local repository
    Create {
        /// Repository name
        name: String,
        /// Any text that would be used to describe the repository
        #[arg(long, default_value = "")]
        comment: String,
        /// Default distribution when publishing from this local repo
        #[arg(long, default_value = "")]
        distribution: String,
        /// Default component when publishing from this local repo
        #[arg(long, default_value = "main")]
        component: String,
    },
    /// List local repositories
    List {
        /// Display list in machine-readable format
        #[arg(long)]
        raw: bool,
    },
    /// Delete local repository
    Drop {
        /// Repository name
        name: String,
    },
}

/// Parse durations such as `100ms`, `2s` or `1m`.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("missing unit in duration '{}' (use ms, s or m)", value))?;
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("invalid duration '{}'", value))?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount * 60)),
        _ => Err(format!("unknown unit '{}' in duration '{}'", unit, value)),
    }
}
