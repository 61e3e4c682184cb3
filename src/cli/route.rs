//! CLI route: dispatch a parsed command against the execution context.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, ConfigCommands, RepoCommands};
use crate::cli::presentation::{
    format_config_show, format_repo_list_raw, format_repo_list_text, format_version,
};
use crate::collection::LocalRepo;
use crate::context::Context;
use crate::error::{AptlyError, StorageError};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Run `command` and return the text to print.
#[instrument(name = "command", skip_all, fields(command = %command_name(command)))]
pub fn run(ctx: &mut Context, command: &Commands) -> Result<String, AptlyError> {
    let name = command_name(command);
    let started = Instant::now();
    debug!(command = %name, "command started");

    let result = match command {
        Commands::Config { command } => handle_config_command(ctx, command),
        Commands::Repo { command } => handle_repo_command(ctx, command),
        Commands::Version => Ok(format_version()),
    };

    debug!(
        command = %name,
        ok = result.is_ok(),
        duration_ms = started.elapsed().as_millis() as u64,
        "command finished"
    );
    result
}

#[instrument(name = "config_command", skip_all)]
fn handle_config_command(ctx: &Context, command: &ConfigCommands) -> Result<String, AptlyError> {
    match command {
        ConfigCommands::Show => format_config_show(
            ctx.config()?,
            ctx.config_source()?,
            ctx.dependency_options()?,
            ctx.architectures()?,
        ),
    }
}

#[instrument(name = "repo_command", skip_all)]
fn handle_repo_command(ctx: &Context, command: &RepoCommands) -> Result<String, AptlyError> {
    let collections = ctx.collection_factory()?;
    let repos = collections.local_repos();

    match command {
        RepoCommands::Create {
            name,
            comment,
            distribution,
            component,
        } => {
            if repos.find(name)?.is_some() {
                return Err(AptlyError::Command(format!(
                    "unable to add local repo: local repo with name {} already exists",
                    name
                )));
            }
            let repo = LocalRepo {
                comment: comment.clone(),
                default_distribution: distribution.clone(),
                default_component: component.clone(),
                ..LocalRepo::new(name.as_str())
            };
            repos.put(&repo)?;
            info!(repo = %name, "local repo created");
            Ok(format!(
                "\nLocal repo [{}] successfully added.\nYou can run 'aptly repo add {} ...' to add packages to repo.",
                name, name
            ))
        }
        RepoCommands::List { raw } => {
            let list = repos.list()?;
            if *raw {
                Ok(format_repo_list_raw(&list))
            } else {
                Ok(format_repo_list_text(&list))
            }
        }
        RepoCommands::Drop { name } => match repos.drop_record(name) {
            Ok(()) => {
                info!(repo = %name, "local repo dropped");
                Ok(format!("Local repo `{}` has been removed.", name))
            }
            Err(StorageError::NotFound(_)) => Err(AptlyError::Command(format!(
                "unable to drop: local repo with name {} not found",
                name
            ))),
            Err(e) => Err(e.into()),
        },
    }
}
