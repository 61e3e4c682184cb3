//! Command names for logging and routing.

use crate::cli::parse::{Commands, ConfigCommands, RepoCommands};

/// Dotted command name (e.g. "repo.create", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
        Commands::Repo { command } => format!("repo.{}", repo_command_name(command)),
        Commands::Version => "version".to_string(),
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
    }
}

pub fn repo_command_name(command: &RepoCommands) -> &'static str {
    match command {
        RepoCommands::Create { .. } => "create",
        RepoCommands::List { .. } => "list",
        RepoCommands::Drop { .. } => "drop",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        assert_eq!(command_name(&Commands::Version), "version");
        assert_eq!(
            command_name(&Commands::Repo {
                command: RepoCommands::Drop {
                    name: "x".to_string()
                }
            }),
            "repo.drop"
        );
        assert_eq!(
            command_name(&Commands::Config {
                command: ConfigCommands::Show
            }),
            "config.show"
        );
    }
}
