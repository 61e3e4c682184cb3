//! Lazy construction and ordered shutdown of the context's shared resources

use crate::integration::test_utils::write_config;
use aptly::collection::LocalRepo;
use aptly::context::{Context, ContextFlags};
use aptly::error::DownloadError;
use aptly::options::{DependencyFlags, DependencyOptions};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn context(test_dir: &TempDir, flags: ContextFlags) -> Context {
    let config = write_config(test_dir, serde_json::json!({}));
    Context::new(
        ContextFlags {
            config: Some(config),
            ..flags
        },
        None,
    )
    .unwrap()
}

#[test]
fn test_full_lifecycle() {
    let test_dir = TempDir::new().unwrap();
    let mut ctx = context(&test_dir, ContextFlags::default());
    let root = test_dir.path().join("aptly");

    let collections = ctx.collection_factory().unwrap();
    collections.local_repos().put(&LocalRepo::new("stable")).unwrap();
    assert_eq!(collections.local_repos().len().unwrap(), 1);
    assert!(root.join("db").exists());

    let source = test_dir.path().join("hello_1.0_amd64.deb");
    std::fs::write(&source, b"package contents").unwrap();
    let pool = ctx.package_pool().unwrap();
    let relative = pool.import(&source).unwrap();
    let pooled = pool.root().join(&relative);
    assert!(pooled.starts_with(root.join("pool")));
    assert!(pooled.exists());

    let published = ctx.published_storage().unwrap();
    published
        .put_file(Path::new("debian/pool/main/h/hello/hello_1.0_amd64.deb"), &pooled)
        .unwrap();
    assert!(root
        .join("public/debian/pool/main/h/hello/hello_1.0_amd64.deb")
        .exists());

    let downloader = ctx.downloader().unwrap();
    assert!(Arc::ptr_eq(&ctx.progress(), &ctx.progress()));

    ctx.shutdown().unwrap();
    ctx.shutdown().unwrap();

    let err = downloader
        .download("http://127.0.0.1:9/Release", &test_dir.path().join("Release"))
        .unwrap_err();
    assert!(matches!(err, DownloadError::Shutdown));
}

#[test]
fn test_shutdown_with_partial_resources() {
    let test_dir = TempDir::new().unwrap();
    let mut ctx = context(&test_dir, ContextFlags::default());
    ctx.progress();
    ctx.package_pool().unwrap();
    ctx.shutdown().unwrap();
}

#[test]
fn test_shutdown_before_config_is_loaded() {
    let test_dir = TempDir::new().unwrap();
    let mut ctx = Context::new(
        ContextFlags {
            config: Some(test_dir.path().join("missing.conf")),
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap();
    ctx.shutdown().unwrap();
}

#[test]
fn test_dependency_options_end_to_end() {
    let test_dir = TempDir::new().unwrap();
    let config = write_config(
        &test_dir,
        serde_json::json!({ "rootDir": "/tmp/x", "dependencyFollowSuggests": true }),
    );
    let ctx = Context::new(
        ContextFlags {
            config: Some(config),
            dependency: DependencyFlags {
                follow_recommends: true,
                ..DependencyFlags::default()
            },
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap();

    let options = ctx.dependency_options().unwrap();
    assert!(options.contains(DependencyOptions::FOLLOW_SUGGESTS));
    assert!(options.contains(DependencyOptions::FOLLOW_RECOMMENDS));
    assert!(!options.contains(DependencyOptions::FOLLOW_ALL_VARIANTS));
    assert!(!options.contains(DependencyOptions::FOLLOW_SOURCE));
    assert_eq!(ctx.dependency_options().unwrap(), options);
}

#[test]
fn test_flags_cannot_disable_config_capabilities() {
    let test_dir = TempDir::new().unwrap();
    let config = write_config(
        &test_dir,
        serde_json::json!({ "dependencyFollowSource": true, "dependencyFollowAllVariants": true }),
    );
    let ctx = Context::new(
        ContextFlags {
            config: Some(config),
            ..ContextFlags::default()
        },
        None,
    )
    .unwrap();

    assert_eq!(
        ctx.dependency_options().unwrap(),
        DependencyOptions::FOLLOW_ALL_VARIANTS | DependencyOptions::FOLLOW_SOURCE
    );
}
