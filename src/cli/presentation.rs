//! CLI presentation: text and json formatters per command family.

use crate::collection::LocalRepo;
use crate::config::{AptlyConfig, ConfigSource};
use crate::error::AptlyError;
use crate::options::DependencyOptions;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

/// Resolved configuration as pretty JSON, followed by where it came from and
/// the effective command-line overrides.
pub fn format_config_show(
    config: &AptlyConfig,
    source: &ConfigSource,
    options: DependencyOptions,
    architectures: &[String],
) -> Result<String, AptlyError> {
    let document = serde_json::to_string_pretty(config)
        .map_err(|e| AptlyError::Command(format!("unable to render config: {}", e)))?;

    let architectures = if architectures.is_empty() {
        "all".to_string()
    } else {
        architectures.join(",")
    };

    Ok(format!(
        "{}\n\nConfig file: {}\nDependency options: {}\nArchitectures: {}",
        document,
        source.path().display(),
        options,
        architectures
    ))
}

pub fn format_repo_list_raw(repos: &[LocalRepo]) -> String {
    repos
        .iter()
        .map(|repo| repo.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_repo_list_text(repos: &[LocalRepo]) -> String {
    if repos.is_empty() {
        return "No local repositories found, create one with `aptly repo create ...`.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Comment", "Distribution", "Component", "Created"]);
    for repo in repos {
        let created = repo.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        table.add_row(vec![
            &repo.name,
            &repo.comment,
            &repo.default_distribution,
            &repo.default_component,
            &created,
        ]);
    }
    format!("List of local repos:\n{}", table)
}

pub fn format_version() -> String {
    format!("aptly version: {}", env!("CARGO_PKG_VERSION"))
}
