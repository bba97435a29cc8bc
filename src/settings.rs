//! Claude Code's `~/.claude/settings.json`.
//!
//! ccc owns only a handful of keys inside the `env` map. Everything else in the
//! file, at any level, is carried through a read-modify-write untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{ProfileError, Result};
use crate::fs_utils::write_private;
use crate::profiles::Profile;

pub const BASE_URL_KEY: &str = "ANTHROPIC_BASE_URL";
pub const AUTH_TOKEN_KEY: &str = "ANTHROPIC_AUTH_TOKEN";
pub const TIMEOUT_KEY: &str = "API_TIMEOUT_MS";
pub const NONESSENTIAL_TRAFFIC_KEY: &str = "CLAUDE_CODE_DISABLE_NONESSENTIAL_TRAFFIC";

pub const DEFAULT_TIMEOUT_MS: &str = "3000000";
pub const DEFAULT_DISABLE_NONESSENTIAL_TRAFFIC: u64 = 1;

/// A value in the `env` map.
///
/// Claude Code accepts strings and bare numbers here; anything else is kept
/// as raw JSON so it is written back exactly as found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    String(String),
    Number(Number),
    Bool(bool),
    Other(Value),
}

impl EnvValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<u64> for EnvValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaudeSettings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub env: BTreeMap<String, EnvValue>,

    /// Every other top-level key (permissions, model, hooks, ...)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, EnvValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, EnvValue>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of reading the settings file
#[derive(Debug)]
pub enum SettingsFile {
    Missing,
    Parsed(ClaudeSettings),
    Corrupt(serde_json::Error),
}

impl ClaudeSettings {
    /// Fresh settings with empty credentials and the default tuning keys
    pub fn with_defaults() -> Self {
        let mut env = BTreeMap::new();
        env.insert(AUTH_TOKEN_KEY.to_string(), EnvValue::from(""));
        env.insert(BASE_URL_KEY.to_string(), EnvValue::from(""));
        env.insert(TIMEOUT_KEY.to_string(), EnvValue::from(DEFAULT_TIMEOUT_MS));
        env.insert(
            NONESSENTIAL_TRAFFIC_KEY.to_string(),
            EnvValue::from(DEFAULT_DISABLE_NONESSENTIAL_TRAFFIC),
        );
        Self {
            env,
            other: Map::new(),
        }
    }

    /// Read the settings file.
    ///
    /// A missing file and unparsable content are reported as variants, only
    /// other read failures are errors.
    pub fn load(path: &Path) -> Result<SettingsFile> {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SettingsFile::Missing),
            Err(e) => return Err(ProfileError::io("failed to read settings file", path, e)),
        };

        Ok(match serde_json::from_slice(&content) {
            Ok(settings) => SettingsFile::Parsed(settings),
            Err(e) => SettingsFile::Corrupt(e),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ProfileError::Serialize("settings", e))?;
        write_private(path, content.as_bytes())
            .map_err(|e| ProfileError::io("failed to write settings file", path, e))?;
        tracing::debug!(path = %path.display(), "wrote settings file");
        Ok(())
    }

    /// Point the credentials at `profile` and fill in missing defaults.
    ///
    /// Existing values for the tuning keys are never overwritten.
    pub fn apply_profile(&mut self, profile: &Profile) {
        self.env
            .insert(AUTH_TOKEN_KEY.to_string(), EnvValue::from(profile.secret.as_str()));
        self.env
            .insert(BASE_URL_KEY.to_string(), EnvValue::from(profile.endpoint.as_str()));

        self.env
            .entry(TIMEOUT_KEY.to_string())
            .or_insert_with(|| EnvValue::from(DEFAULT_TIMEOUT_MS));
        self.env
            .entry(NONESSENTIAL_TRAFFIC_KEY.to_string())
            .or_insert_with(|| EnvValue::from(DEFAULT_DISABLE_NONESSENTIAL_TRAFFIC));
    }

    /// Base URL and token, when both are non-empty strings
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let base_url = self.env.get(BASE_URL_KEY)?.as_str()?;
        let token = self.env.get(AUTH_TOKEN_KEY)?.as_str()?;
        if base_url.is_empty() || token.is_empty() {
            return None;
        }
        Some((base_url, token))
    }
}
