//! CLI domain: parse, route, help, output, and presentation only.
//! Handlers reach shared resources exclusively through the execution context.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{parse_duration, Cli, Commands, ConfigCommands, GlobalArgs, RepoCommands};
pub use route::run;
