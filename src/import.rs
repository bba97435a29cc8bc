//! First-run import of credentials that were configured before ccc.
//!
//! Only consulted when no profile store exists yet. Every failure here means
//! "nothing to import"; none of them is reported as an error.

use std::path::Path;
use url::{Host, Url};

use crate::profiles::Profile;
use crate::settings::{AUTH_TOKEN_KEY, BASE_URL_KEY, ClaudeSettings, SettingsFile};

const FALLBACK_NAME: &str = "default";

/// Derive a short profile name from an endpoint URL.
///
/// `https://api.anthropic.com` and `https://anthropic.com` both give
/// `anthropic`. This is a heuristic and knows nothing about public suffixes.
pub fn extract_name(endpoint: &str) -> String {
    if endpoint.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let Ok(url) = Url::parse(endpoint) else {
        return FALLBACK_NAME.to_string();
    };
    // IPv6 hosts are named without their brackets
    let host = match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => return FALLBACK_NAME.to_string(),
    };

    let host = host.strip_prefix("www.").unwrap_or(&host);
    let labels: Vec<&str> = host.split('.').collect();

    let name = match labels.len() {
        n if n >= 3 => labels[1],
        2 => labels[0],
        _ => host,
    };
    name.to_string()
}

fn imported_profile(endpoint: &str, secret: &str) -> Profile {
    let mut profile = Profile::new(extract_name(endpoint), endpoint, secret);
    profile.active = true;
    profile
}

/// Import from `ANTHROPIC_BASE_URL` / `ANTHROPIC_AUTH_TOKEN` in this process
pub fn from_environment() -> Option<Profile> {
    let endpoint = std::env::var(BASE_URL_KEY).ok().filter(|v| !v.is_empty())?;
    let secret = std::env::var(AUTH_TOKEN_KEY).ok().filter(|v| !v.is_empty())?;

    tracing::debug!(endpoint = %endpoint, "found credentials in environment");
    Some(imported_profile(&endpoint, &secret))
}

/// Import from the `env` map of Claude's settings file
pub fn from_settings_file(path: &Path) -> Option<Profile> {
    let settings = match ClaudeSettings::load(path) {
        Ok(SettingsFile::Parsed(settings)) => settings,
        Ok(SettingsFile::Missing) => return None,
        Ok(SettingsFile::Corrupt(e)) => {
            tracing::debug!(path = %path.display(), error = %e, "settings file not importable");
            return None;
        }
        Err(e) => {
            tracing::debug!(error = %e, "settings file not readable");
            return None;
        }
    };

    let (endpoint, secret) = settings.credentials()?;
    tracing::debug!(path = %path.display(), endpoint = %endpoint, "found credentials in settings file");
    Some(imported_profile(endpoint, secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_extract_name() {
        assert_eq!(extract_name("https://api.anthropic.com"), "anthropic");
        assert_eq!(extract_name("https://anthropic.com"), "anthropic");
        assert_eq!(extract_name("https://www.anthropic.com/v1"), "anthropic");
        assert_eq!(extract_name("https://a.b.example.co.uk:8443"), "b");
        assert_eq!(extract_name("http://localhost:8080"), "localhost");
        assert_eq!(extract_name("http://[::1]:8080/v1"), "::1");
        assert_eq!(extract_name("http://127.0.0.1:8080"), "0");
    }

    #[test]
    fn test_extract_name_fallbacks() {
        assert_eq!(extract_name(""), "default");
        assert_eq!(extract_name("not a url"), "default");
        assert_eq!(extract_name("://missing-scheme"), "default");
        assert_eq!(extract_name("file:///tmp/x"), "default");
    }

    fn write_settings(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("settings.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_from_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_settings(
            &temp_dir,
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://api.moonshot.cn/anthropic", "ANTHROPIC_AUTH_TOKEN": "sk-123"}}"#,
        );

        let profile = from_settings_file(&path).unwrap();
        assert_eq!(profile.name, "moonshot");
        assert_eq!(profile.endpoint, "https://api.moonshot.cn/anthropic");
        assert_eq!(profile.secret, "sk-123");
        assert!(profile.active);
    }

    #[test]
    fn test_from_settings_file_nothing_to_import() {
        let temp_dir = TempDir::new().unwrap();
        assert!(from_settings_file(&temp_dir.path().join("missing.json")).is_none());

        let path = write_settings(&temp_dir, "garbage");
        assert!(from_settings_file(&path).is_none());

        let path = write_settings(&temp_dir, r#"{"env": {"ANTHROPIC_BASE_URL": "https://x.test"}}"#);
        assert!(from_settings_file(&path).is_none());

        let path = write_settings(
            &temp_dir,
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://x.test", "ANTHROPIC_AUTH_TOKEN": ""}}"#,
        );
        assert!(from_settings_file(&path).is_none());
    }

    #[test]
    #[serial]
    fn test_from_environment() {
        // SAFETY: serialized with every other test that touches these variables
        unsafe {
            std::env::set_var(BASE_URL_KEY, "https://api.deepseek.com/anthropic");
            std::env::set_var(AUTH_TOKEN_KEY, "sk-env");
        }
        let profile = from_environment().unwrap();
        assert_eq!(profile.name, "deepseek");
        assert!(profile.active);

        unsafe {
            std::env::set_var(AUTH_TOKEN_KEY, "");
        }
        assert!(from_environment().is_none());

        unsafe {
            std::env::remove_var(BASE_URL_KEY);
            std::env::remove_var(AUTH_TOKEN_KEY);
        }
        assert!(from_environment().is_none());
    }
}
