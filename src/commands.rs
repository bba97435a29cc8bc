//! High-level command orchestration for the CLI.
//!
//! Each handler loads the profile store, applies one operation, saves if
//! anything changed and reports through `crate::ui`. Domain failures are
//! raised before the save, so a rejected command never touches the store.
//!
//! Each function here generally corresponds to a subcommand in `main.rs`.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use inquire::{Password, PasswordDisplayMode};

use crate::activation::{Activation, ActivationTarget};
use crate::display::{mask_secret, render_table};
use crate::doctor::run_doctor;
use crate::paths::Paths;
use crate::profiles::{Profile, ProfileCollection};
use crate::settings::{AUTH_TOKEN_KEY, BASE_URL_KEY};
use crate::store;
use crate::ui::Ui;

/// Load the store, announcing a first-run import
fn load_profiles(paths: &Paths, target: &ActivationTarget, ui: &Ui) -> Result<ProfileCollection> {
    let loaded = store::load(paths, target)?;
    if let Some(name) = &loaded.imported {
        ui.info(format!(
            "Auto-imported configuration '{}' from existing settings",
            name
        ));
    }
    Ok(loaded.profiles)
}

/// List all configurations
pub fn list(paths: &Paths, target: &ActivationTarget, ui: &Ui) -> Result<()> {
    ui.print(listing(paths, target, ui)?);
    Ok(())
}

/// Text printed by `list`
fn listing(paths: &Paths, target: &ActivationTarget, ui: &Ui) -> Result<String> {
    let profiles = load_profiles(paths, target, ui)?;

    if profiles.is_empty() {
        return Ok(format!(
            "No configurations found.\n{}\n",
            ui.dim("Create one with: ccc add -n <name> -u <base-url> -k <api-key>")
        ));
    }

    Ok(render_table(&profiles))
}

/// Resolve the API key for `add`, prompting on a terminal when it was not passed
fn resolve_secret(secret: Option<String>, ui: &Ui) -> Result<String> {
    let secret = match secret {
        Some(secret) => secret,
        None if ui.interactive => Password::new("API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .context("API key input cancelled")?,
        None => bail!("API key is required (pass -k <api-key>)"),
    };

    if secret.is_empty() {
        bail!("API key cannot be empty");
    }
    Ok(secret)
}

/// Add a new configuration
pub fn add(
    paths: &Paths,
    target: &ActivationTarget,
    name: &str,
    endpoint: &str,
    secret: Option<String>,
    ui: &Ui,
) -> Result<()> {
    let secret = resolve_secret(secret, ui)?;
    let mut profiles = load_profiles(paths, target, ui)?;

    let active = profiles.add(name, endpoint, &secret)?.active;
    store::save(paths, &profiles)?;

    if active {
        ui.ok(format!("Configuration '{}' added and activated successfully.", name));
        ui.println(ui.dim(format!(
            "Run 'ccc activate -n {}' to apply it to {}.",
            name,
            target.describe()
        )));
    } else {
        ui.ok(format!("Configuration '{}' added successfully.", name));
    }
    Ok(())
}

/// Update the base URL and/or API key of a configuration
pub fn update(
    paths: &Paths,
    target: &ActivationTarget,
    name: &str,
    endpoint: Option<&str>,
    secret: Option<&str>,
    ui: &Ui,
) -> Result<()> {
    let mut profiles = load_profiles(paths, target, ui)?;

    profiles.update(name, endpoint, secret)?;
    store::save(paths, &profiles)?;

    ui.ok(format!("Configuration '{}' updated successfully.", name));
    if profiles.find(name).is_some_and(|p| p.active) {
        ui.println(ui.dim(format!(
            "'{}' is active; run 'ccc activate -n {}' to apply the change.",
            name, name
        )));
    }
    Ok(())
}

/// Delete an inactive configuration
pub fn delete(paths: &Paths, target: &ActivationTarget, name: &str, ui: &Ui) -> Result<()> {
    let mut profiles = load_profiles(paths, target, ui)?;

    profiles.delete(name)?;
    store::save(paths, &profiles)?;

    ui.ok(format!("Configuration '{}' deleted successfully.", name));
    Ok(())
}

/// Mark a configuration active and apply it to the platform target
pub fn activate(paths: &Paths, target: &ActivationTarget, name: &str, ui: &Ui) -> Result<()> {
    let mut profiles = load_profiles(paths, target, ui)?;

    let profile = profiles.set_active(name)?.clone();
    store::save(paths, &profiles)?;

    ui.ok(format!("Configuration '{}' activated successfully.", name));

    let spinner = ui.spinner(format!("Applying '{}' to {}...", name, target.describe()));
    match target.apply(&profile) {
        Ok(activation) => {
            spinner.finish_and_clear();
            report_activation(&profile, &activation, ui);
            Ok(())
        }
        Err(e) => {
            ui.spinner_finish_err(&spinner, format!("Failed to apply settings: {}", e));
            Err(e.into())
        }
    }
}

fn report_activation(profile: &Profile, activation: &Activation, ui: &Ui) {
    match activation {
        Activation::Environment {
            persisted,
            failures,
        } => {
            ui.ok(format!(
                "Environment variables set for active configuration '{}':",
                profile.name
            ));
            ui.println(format!("  {}={}", BASE_URL_KEY, profile.endpoint));
            ui.println(format!("  {}={}", AUTH_TOKEN_KEY, mask_secret(&profile.secret)));

            for variable in persisted {
                ui.ok(format!("Set permanent {}", variable));
            }
            for failure in failures {
                ui.warn(format!(
                    "Failed to set permanent {}: {}",
                    failure.variable, failure.error
                ));
                if !failure.output.is_empty() {
                    ui.eprintln(format!("Output: {}", failure.output));
                }
            }
            ui.println(ui.dim(
                "Permanent environment variables are available in new command prompt windows.",
            ));
        }
        Activation::SettingsFile { path, recovered } => {
            if let Some(recovered) = recovered {
                ui.warn(format!(
                    "Failed to parse existing settings.json, created a new one: {}",
                    recovered.error
                ));
                if let Some(backup) = &recovered.backup {
                    ui.warn(format!("Previous contents saved to {}", backup.display()));
                }
            }

            ui.ok(format!(
                "Claude settings updated for active configuration '{}'",
                profile.name
            ));
            let mut table = ui.simple_table();
            table.add_row(vec![ui.cell("Settings file:"), ui.cell(path.display().to_string())]);
            table.add_row(vec![ui.cell("Base URL:"), ui.cell(&profile.endpoint)]);
            table.add_row(vec![ui.cell("API Key:"), ui.cell(mask_secret(&profile.secret))]);
            ui.println(table.to_string());
        }
        Activation::Skipped { os } => {
            ui.warn(format!(
                "Unsupported platform ({}), settings not applied",
                os
            ));
        }
    }
}

/// Show the active configuration and where it is applied
pub fn current(paths: &Paths, target: &ActivationTarget, ui: &Ui) -> Result<()> {
    let profiles = load_profiles(paths, target, ui)?;

    let Some(active) = profiles.active() else {
        ui.warn("No active configuration.");
        if !profiles.is_empty() {
            ui.println(ui.dim("Activate one with: ccc activate -n <name>"));
        }
        return Ok(());
    };

    ui.section("Current Configuration");
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![ui.cell("Name:"), ui.header_cell(&active.name)]);
    table.add_row(vec![ui.cell("Base URL:"), ui.cell(&active.endpoint)]);
    table.add_row(vec![ui.cell("API Key:"), ui.cell(mask_secret(&active.secret))]);
    table.add_row(vec![
        ui.cell("Applied to:"),
        ui.colored_cell(target.describe(), AnsiColor::Cyan),
    ]);
    table.add_row(vec![ui.cell("Store:"), ui.cell(paths.store_file.display().to_string())]);
    ui.println(table.to_string());

    Ok(())
}

/// Run diagnostics
pub fn doctor(paths: &Paths, target: &ActivationTarget, ui: &Ui) -> Result<()> {
    if !run_doctor(paths, target, ui) {
        bail!("Doctor found issues");
    }
    Ok(())
}
