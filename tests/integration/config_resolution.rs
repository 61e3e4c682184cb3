//! Configuration fallback chain as seen through the execution context

use crate::integration::test_utils::{with_home_env, write_config};
use aptly::config::{ConfigSource, SYSTEM_CONFIG_PATH, USER_CONFIG_FILE};
use aptly::context::{Context, ContextFlags};
use aptly::error::AptlyError;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_default_config_created_in_home() {
    let test_dir = TempDir::new().unwrap();
    with_home_env(&test_dir, |home| {
        let ctx = Context::new(ContextFlags::default(), None).unwrap();
        let source = ctx.config_source().unwrap().clone();

        if Path::new(SYSTEM_CONFIG_PATH).exists() {
            // The host's system config wins over creating a default.
            assert_eq!(source, ConfigSource::File(SYSTEM_CONFIG_PATH.into()));
            return;
        }

        let user = home.join(USER_CONFIG_FILE);
        assert_eq!(source, ConfigSource::Created(user.clone()));
        assert!(user.exists());
        assert_eq!(ctx.config().unwrap().root_dir, home.join(".aptly"));
    });
}

#[test]
fn test_user_config_is_used() {
    let test_dir = TempDir::new().unwrap();
    with_home_env(&test_dir, |home| {
        std::fs::write(
            home.join(USER_CONFIG_FILE),
            r#"{"rootDir": "/srv/aptly", "downloadConcurrency": 8}"#,
        )
        .unwrap();

        let ctx = Context::new(ContextFlags::default(), None).unwrap();
        assert_eq!(
            ctx.config_source().unwrap(),
            &ConfigSource::File(home.join(USER_CONFIG_FILE))
        );
        assert_eq!(ctx.config().unwrap().download_concurrency, 8);
    });
}

#[test]
fn test_malformed_user_config_stops_the_chain() {
    let test_dir = TempDir::new().unwrap();
    let user = test_dir.path().join("user.conf");
    let system = test_dir.path().join("system.conf");
    std::fs::write(&user, "{ not json").unwrap();
    std::fs::write(&system, r#"{"rootDir": "/srv/aptly"}"#).unwrap();

    let ctx = Context::new(ContextFlags::default(), None)
        .unwrap()
        .with_config_locations(vec![user.clone(), system]);

    let err = ctx.config().err().unwrap();
    assert!(matches!(err, AptlyError::Fatal(_)));
    assert!(err.to_string().contains(&user.display().to_string()));
}

#[test]
fn test_system_config_used_when_user_missing() {
    let test_dir = TempDir::new().unwrap();
    let user = test_dir.path().join("user.conf");
    let system = test_dir.path().join("system.conf");
    std::fs::write(&system, r#"{"architectures": ["amd64"]}"#).unwrap();

    let ctx = Context::new(ContextFlags::default(), None)
        .unwrap()
        .with_config_locations(vec![user.clone(), system.clone()]);

    assert_eq!(ctx.config_source().unwrap(), &ConfigSource::File(system));
    assert_eq!(ctx.architectures().unwrap(), ["amd64"]);
    assert!(!user.exists());
}

#[test]
fn test_explicit_config_bypasses_fallback() {
    let test_dir = TempDir::new().unwrap();
    let explicit = write_config(&test_dir, serde_json::json!({ "gpgDisableSign": true }));
    let user = test_dir.path().join("user.conf");

    let ctx = Context::new(
        ContextFlags {
            config: Some(explicit.clone()),
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap()
    .with_config_locations(vec![user.clone()]);

    assert_eq!(ctx.config_source().unwrap(), &ConfigSource::Explicit(explicit));
    assert!(ctx.config().unwrap().gpg_disable_sign);
    assert!(!user.exists());
}

#[test]
fn test_invalid_values_are_fatal() {
    let test_dir = TempDir::new().unwrap();
    let explicit = write_config(&test_dir, serde_json::json!({ "downloadConcurrency": 0 }));

    let ctx = Context::new(
        ContextFlags {
            config: Some(explicit),
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap();

    let err = ctx.downloader().err().unwrap();
    assert!(matches!(err, AptlyError::Fatal(_)));
    assert!(err.to_string().contains("downloadConcurrency"));
}
