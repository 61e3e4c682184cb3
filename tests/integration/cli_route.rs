//! Command routing through the execution context

use crate::integration::test_utils::write_config;
use aptly::cli::{run, Cli, Commands, ConfigCommands, RepoCommands};
use aptly::context::{Context, ContextFlags};
use aptly::error::AptlyError;
use clap::Parser;
use tempfile::TempDir;

fn context(test_dir: &TempDir) -> Context {
    let config = write_config(test_dir, serde_json::json!({ "architectures": ["amd64"] }));
    Context::new(
        ContextFlags {
            config: Some(config),
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap()
}

fn create(name: &str) -> Commands {
    Commands::Repo {
        command: RepoCommands::Create {
            name: name.to_string(),
            comment: "nightly builds".to_string(),
            distribution: "bookworm".to_string(),
            component: "main".to_string(),
        },
    }
}

#[test]
fn test_repo_create_list_drop() {
    let test_dir = TempDir::new().unwrap();
    let mut ctx = context(&test_dir);

    let output = run(&mut ctx, &create("nightly")).unwrap();
    assert!(output.contains("Local repo [nightly] successfully added."));

    let listed = run(
        &mut ctx,
        &Commands::Repo {
            command: RepoCommands::List { raw: true },
        },
    )
    .unwrap();
    assert_eq!(listed, "nightly");

    let table = run(
        &mut ctx,
        &Commands::Repo {
            command: RepoCommands::List { raw: false },
        },
    )
    .unwrap();
    assert!(table.contains("bookworm"));
    assert!(table.contains("nightly builds"));

    let dropped = run(
        &mut ctx,
        &Commands::Repo {
            command: RepoCommands::Drop {
                name: "nightly".to_string(),
            },
        },
    )
    .unwrap();
    assert!(dropped.contains("has been removed"));

    ctx.shutdown().unwrap();
}

#[test]
fn test_duplicate_and_missing_repos() {
    let test_dir = TempDir::new().unwrap();
    let mut ctx = context(&test_dir);

    run(&mut ctx, &create("stable")).unwrap();
    let err = run(&mut ctx, &create("stable")).unwrap_err();
    assert!(matches!(err, AptlyError::Command(_)));
    assert!(err.to_string().contains("already exists"));

    let err = run(
        &mut ctx,
        &Commands::Repo {
            command: RepoCommands::Drop {
                name: "ghost".to_string(),
            },
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert_eq!(err.exit_code(), 1);

    ctx.shutdown().unwrap();
}

#[test]
fn test_config_show_applies_flags() {
    let test_dir = TempDir::new().unwrap();
    let config = write_config(&test_dir, serde_json::json!({ "architectures": ["amd64"] }));
    let config_arg = config.to_string_lossy();

    let cli = Cli::try_parse_from([
        "aptly",
        "--config",
        config_arg.as_ref(),
        "--dep-follow-suggests",
        "--architectures",
        "i386,armhf",
        "config",
        "show",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommands::Show
        }
    ));

    let mut ctx = Context::new(cli.global.context_flags(), None).unwrap();
    let output = run(&mut ctx, &cli.command).unwrap();
    assert!(output.contains("\"architectures\": ["));
    assert!(output.contains("Dependency options: suggests"));
    assert!(output.contains("Architectures: i386,armhf"));
    assert!(output.contains(&format!("Config file: {}", config.display())));
}

#[test]
fn test_version_needs_no_config() {
    let test_dir = TempDir::new().unwrap();
    let mut ctx = Context::new(
        ContextFlags {
            config: Some(test_dir.path().join("missing.conf")),
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap();

    let output = run(&mut ctx, &Commands::Version).unwrap();
    assert!(output.starts_with("aptly version: "));
}

#[test]
fn test_repo_command_with_broken_root_is_fatal() {
    let test_dir = TempDir::new().unwrap();
    std::fs::write(test_dir.path().join("aptly"), b"not a directory").unwrap();
    let mut ctx = context(&test_dir);

    let err = run(
        &mut ctx,
        &Commands::Repo {
            command: RepoCommands::List { raw: true },
        },
    )
    .unwrap_err();
    assert!(matches!(err, AptlyError::Fatal(_)));
    assert!(err.to_string().starts_with("can't open database"));
}
