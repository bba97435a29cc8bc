//! Diagnostic tool for ccc.
//!
//! This module implements the `ccc doctor` command, which checks:
//! - That the profile store parses and keeps its invariants (unique names,
//!   at most one active profile).
//! - That the activation target currently holds the active profile's values.
//!
//! It reports issues to the user with a pass/fail/warn status.

use anstyle::AnsiColor;
use std::collections::HashSet;

use crate::activation::ActivationTarget;
use crate::display::mask_secret;
use crate::paths::Paths;
use crate::profiles::{Profile, ProfileCollection};
use crate::settings::{AUTH_TOKEN_KEY, BASE_URL_KEY, ClaudeSettings, SettingsFile};
use crate::ui::Ui;

/// Run the doctor diagnostics, returning whether every check passed
pub fn run_doctor(paths: &Paths, target: &ActivationTarget, ui: &Ui) -> bool {
    ui.section("ccc Doctor");
    ui.newline();

    let mut active: Option<Profile> = None;

    let store_ok = check_step(ui, "Config File", || {
        let profiles = match ProfileCollection::read(&paths.store_file) {
            Ok(Some(profiles)) => profiles,
            Ok(None) => {
                ui.println(format!(
                    "  {} Config file missing (fresh install?): {}",
                    ui.icon_warn(),
                    paths.store_file.display()
                ));
                return true;
            }
            Err(e) => {
                ui.println(format!("  {} {}", ui.icon_err(), e));
                return false;
            }
        };

        ui.println(format!(
            "  {} {} configuration(s) in {}",
            ui.icon_ok(),
            profiles.len(),
            paths.store_file.display()
        ));

        let mut ok = true;
        let mut seen = HashSet::new();
        for profile in profiles.iter() {
            if profile.name.is_empty() {
                ui.println(format!("  {} A configuration has an empty name", ui.icon_err()));
                ok = false;
            } else if !seen.insert(profile.name.as_str()) {
                ui.println(format!(
                    "  {} Duplicate configuration name: {}",
                    ui.icon_err(),
                    profile.name
                ));
                ok = false;
            }
        }

        let active_count = profiles.iter().filter(|p| p.active).count();
        match active_count {
            0 if !profiles.is_empty() => {
                ui.println(format!("  {} No active configuration", ui.icon_warn()));
            }
            0 => {}
            1 => {
                if let Some(profile) = profiles.active() {
                    ui.println(format!("  {} Active configuration: {}", ui.icon_info(), profile.name));
                    active = Some(profile.clone());
                }
            }
            n => {
                ui.println(format!("  {} {} configurations are marked active", ui.icon_err(), n));
                ok = false;
            }
        }
        ok
    });

    let target_ok = check_step(ui, "Activation Target", || {
        ui.println(format!("  {} Target: {}", ui.icon_info(), target.describe()));
        match target {
            ActivationTarget::SettingsFile { settings_path } => {
                check_settings_file(settings_path, active.as_ref(), ui)
            }
            ActivationTarget::Environment { .. } => check_environment(active.as_ref(), ui),
            ActivationTarget::Unsupported { os } => {
                ui.println(format!(
                    "  {} Activation is not supported on {}",
                    ui.icon_warn(),
                    os
                ));
                true
            }
        }
    });

    store_ok && target_ok
}

fn check_settings_file(path: &std::path::Path, active: Option<&Profile>, ui: &Ui) -> bool {
    let settings = match ClaudeSettings::load(path) {
        Ok(SettingsFile::Parsed(settings)) => settings,
        Ok(SettingsFile::Missing) => {
            ui.println(format!("  {} Settings file missing", ui.icon_warn()));
            return true;
        }
        Ok(SettingsFile::Corrupt(e)) => {
            ui.println(format!("  {} Settings file is not valid JSON: {}", ui.icon_err(), e));
            return false;
        }
        Err(e) => {
            ui.println(format!("  {} {}", ui.icon_err(), e));
            return false;
        }
    };

    ui.println(format!("  {} Settings file readable", ui.icon_ok()));
    report_sync(settings.credentials(), active, ui);
    true
}

fn check_environment(active: Option<&Profile>, ui: &Ui) -> bool {
    let base_url = std::env::var(BASE_URL_KEY).unwrap_or_default();
    let token = std::env::var(AUTH_TOKEN_KEY).unwrap_or_default();

    let current = (!base_url.is_empty() && !token.is_empty())
        .then_some((base_url.as_str(), token.as_str()));
    report_sync(current, active, ui);
    true
}

fn report_sync(current: Option<(&str, &str)>, active: Option<&Profile>, ui: &Ui) {
    match (current, active) {
        (Some((base_url, token)), Some(profile)) => {
            if base_url == profile.endpoint && token == profile.secret {
                ui.println(format!("  {} In sync with '{}'", ui.icon_ok(), profile.name));
            } else {
                ui.println(format!(
                    "  {} Out of sync with '{}' (found {} / {})",
                    ui.icon_warn(),
                    profile.name,
                    base_url,
                    ui.dim(mask_secret(token))
                ));
                ui.println(format!("    Run 'ccc activate -n {}' to re-apply it", profile.name));
            }
        }
        (Some((base_url, _)), None) => {
            ui.println(format!(
                "  {} Credentials configured for {} but no configuration is active",
                ui.icon_warn(),
                base_url
            ));
        }
        (None, Some(profile)) => {
            ui.println(format!(
                "  {} No credentials applied; run 'ccc activate -n {}'",
                ui.icon_warn(),
                profile.name
            ));
        }
        (None, None) => {
            ui.println(format!("  {} No credentials applied", ui.icon_info()));
        }
    }
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> bool
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{settings_target, setup_test_paths};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_doctor_fresh_install() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        assert!(run_doctor(&paths, &settings_target(&paths), &Ui::plain()));
    }

    #[test]
    fn test_doctor_in_sync() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let target = settings_target(&paths);

        let mut profiles = ProfileCollection::new();
        profiles.add("a", "https://a.test", "key-a").unwrap();
        profiles.write(&paths.store_file).unwrap();
        target.apply(profiles.active().unwrap()).unwrap();

        assert!(run_doctor(&paths, &target, &Ui::plain()));
    }

    #[test]
    fn test_doctor_flags_two_active_profiles() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::create_dir_all(paths.store_file.parent().unwrap()).unwrap();
        fs::write(
            &paths.store_file,
            r#"{"configurations": [
                {"name": "a", "base_url": "https://a.test", "api_key": "1", "active": true},
                {"name": "b", "base_url": "https://b.test", "api_key": "2", "active": true}
            ]}"#,
        )
        .unwrap();

        assert!(!run_doctor(&paths, &settings_target(&paths), &Ui::plain()));
    }

    #[test]
    fn test_doctor_flags_corrupt_settings() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::create_dir_all(&paths.claude_dir).unwrap();
        fs::write(&paths.claude_settings, "nope").unwrap();

        assert!(!run_doctor(&paths, &settings_target(&paths), &Ui::plain()));
    }
}
