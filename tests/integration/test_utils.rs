//! Shared test utilities for integration tests
//!
//! Provides isolated HOME directories and ready-made configuration files so tests
//! never touch the real user configuration.

use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize HOME access across all tests
/// This prevents race conditions when tests run in parallel
static HOME_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with HOME pointing at `<test_dir>/home`, restoring it afterwards.
pub fn with_home_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce(PathBuf) -> R,
{
    let _guard = HOME_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let original = std::env::var_os("HOME");

    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    std::env::set_var("HOME", &home);

    let result = f(home);

    match original {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    result
}

/// Write a config document into `test_dir` whose root directory lives next to it.
pub fn write_config(test_dir: &TempDir, extra: serde_json::Value) -> PathBuf {
    let mut document = serde_json::json!({ "rootDir": test_dir.path().join("aptly") });
    if let (Some(target), Some(source)) = (document.as_object_mut(), extra.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }

    let path = test_dir.path().join("aptly.conf");
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}
