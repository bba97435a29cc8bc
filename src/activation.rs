//! Profile activation.
//!
//! This module applies the active profile where Claude Code reads it:
//! - On Windows, the `ANTHROPIC_*` environment variables, set for this process
//!   and persisted for new sessions with `setx`.
//! - On Linux and macOS, the `env` map of `~/.claude/settings.json`.
//!
//! The target is chosen once per invocation and also decides where first-run
//! credentials are imported from.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{ProfileError, Result};
use crate::fs_utils::backup_file;
use crate::import;
use crate::paths::Paths;
use crate::profiles::Profile;
use crate::settings::{AUTH_TOKEN_KEY, BASE_URL_KEY, ClaudeSettings, SettingsFile};

/// Program used to persist user environment variables on Windows
pub const PERSIST_PROGRAM: &str = "setx";

/// Where a profile's credentials are written on activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationTarget {
    /// Process environment plus `<persist_program> NAME VALUE` for future sessions
    Environment { persist_program: String },
    /// A Claude Code settings.json file
    SettingsFile { settings_path: PathBuf },
    /// Nothing is written
    Unsupported { os: String },
}

/// A persistent variable that could not be set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistFailure {
    pub variable: &'static str,
    pub error: String,
    /// Combined stdout and stderr of the persist command
    pub output: String,
}

/// A settings file that did not parse and was replaced with defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptSettings {
    pub error: String,
    pub backup: Option<PathBuf>,
}

/// What an activation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Environment {
        persisted: Vec<&'static str>,
        failures: Vec<PersistFailure>,
    },
    SettingsFile {
        path: PathBuf,
        recovered: Option<CorruptSettings>,
    },
    Skipped {
        os: String,
    },
}

impl ActivationTarget {
    /// Pick the target for the platform this binary was built for
    pub fn detect(paths: &Paths) -> Self {
        let target = if cfg!(windows) {
            Self::Environment {
                persist_program: PERSIST_PROGRAM.to_string(),
            }
        } else if cfg!(any(target_os = "linux", target_os = "macos")) {
            Self::SettingsFile {
                settings_path: paths.claude_settings.clone(),
            }
        } else {
            Self::Unsupported {
                os: std::env::consts::OS.to_string(),
            }
        };
        tracing::debug!(?target, "selected activation target");
        target
    }

    /// Short description of where credentials go
    pub fn describe(&self) -> String {
        match self {
            Self::Environment { .. } => format!("environment ({}, {})", BASE_URL_KEY, AUTH_TOKEN_KEY),
            Self::SettingsFile { settings_path } => settings_path.display().to_string(),
            Self::Unsupported { os } => format!("none (unsupported platform: {})", os),
        }
    }

    /// Credentials already configured at this target, as an active profile
    pub fn import_existing(&self) -> Option<Profile> {
        match self {
            Self::Environment { .. } => import::from_environment(),
            Self::SettingsFile { settings_path } => import::from_settings_file(settings_path),
            Self::Unsupported { .. } => None,
        }
    }

    /// Write `profile`'s endpoint and key to this target
    pub fn apply(&self, profile: &Profile) -> Result<Activation> {
        match self {
            Self::Environment { persist_program } => apply_environment(profile, persist_program),
            Self::SettingsFile { settings_path } => apply_settings_file(profile, settings_path),
            Self::Unsupported { os } => {
                tracing::debug!(os = %os, "no activation target for this platform");
                Ok(Activation::Skipped { os: os.clone() })
            }
        }
    }
}

fn apply_environment(profile: &Profile, persist_program: &str) -> Result<Activation> {
    let vars = [
        (BASE_URL_KEY, profile.endpoint.as_str()),
        (AUTH_TOKEN_KEY, profile.secret.as_str()),
    ];

    for (name, value) in vars {
        if value.contains('\0') {
            return Err(ProfileError::InvalidEnvValue(name));
        }
    }

    for (name, value) in vars {
        // SAFETY: ccc is single-threaded; no other thread reads the environment.
        unsafe { std::env::set_var(name, value) };
    }

    let mut persisted = Vec::new();
    let mut failures = Vec::new();
    for (name, value) in vars {
        match persist_variable(persist_program, name, value) {
            Ok(()) => persisted.push(name),
            Err(failure) => failures.push(failure),
        }
    }

    Ok(Activation::Environment {
        persisted,
        failures,
    })
}

fn persist_variable(program: &str, name: &'static str, value: &str) -> std::result::Result<(), PersistFailure> {
    tracing::debug!(program, variable = name, "persisting environment variable");

    let output = Command::new(program)
        .arg(name)
        .arg(value)
        .output()
        .map_err(|e| PersistFailure {
            variable: name,
            error: e.to_string(),
            output: String::new(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Err(PersistFailure {
        variable: name,
        error: output.status.to_string(),
        output: combined.trim().to_string(),
    })
}

fn apply_settings_file(profile: &Profile, settings_path: &std::path::Path) -> Result<Activation> {
    if let Some(dir) = settings_path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| ProfileError::io("failed to create settings directory", dir, e))?;
    }

    let (mut settings, recovered) = match ClaudeSettings::load(settings_path)? {
        SettingsFile::Parsed(settings) => (settings, None),
        SettingsFile::Missing => (ClaudeSettings::with_defaults(), None),
        SettingsFile::Corrupt(parse_error) => {
            let backup = backup_file(settings_path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not back up corrupt settings file");
                None
            });
            let recovered = CorruptSettings {
                error: parse_error.to_string(),
                backup,
            };
            (ClaudeSettings::with_defaults(), Some(recovered))
        }
    };

    settings.apply_profile(profile);
    settings.save(settings_path)?;

    Ok(Activation::SettingsFile {
        path: settings_path.to_path_buf(),
        recovered,
    })
}
