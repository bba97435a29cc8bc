//! Test utilities shared across test modules
//!
//! Tests never touch the real `~/.claude` or the store beside the test binary;
//! everything lives inside a temporary directory.

use crate::activation::ActivationTarget;
use crate::paths::Paths;
use tempfile::TempDir;

/// Create a Paths struct for testing using a temporary directory
///
/// Mirrors the real layout: the store beside a fake executable directory and
/// `.claude/settings.json` under a fake home.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths {
        store_file: temp_dir.path().join("bin/ccc-config.json"),
        claude_dir: temp_dir.path().join(".claude"),
        claude_settings: temp_dir.path().join(".claude/settings.json"),
    }
}

/// Settings-file activation target pointing into the test paths
pub fn settings_target(paths: &Paths) -> ActivationTarget {
    ActivationTarget::SettingsFile {
        settings_path: paths.claude_settings.clone(),
    }
}
