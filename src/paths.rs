use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

/// File name of the profile store, kept beside the executable
pub const STORE_FILE_NAME: &str = "ccc-config.json";

/// All computed paths used by ccc
#[derive(Debug, Clone)]
pub struct Paths {
    /// <exe dir>/ccc-config.json, unless overridden
    pub store_file: PathBuf,
    /// ~/.claude
    pub claude_dir: PathBuf,
    /// ~/.claude/settings.json
    pub claude_settings: PathBuf,
}

impl Paths {
    /// Resolve every path once for this invocation.
    ///
    /// `store_override` replaces the store location (from `--config` or `CCC_CONFIG`).
    pub fn new(store_override: Option<PathBuf>) -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        let home = base_dirs.home_dir();

        let store_file = match store_override {
            Some(path) => path,
            None => default_store_file()?,
        };
        let claude_dir = home.join(".claude");
        let claude_settings = claude_dir.join("settings.json");

        tracing::debug!(store = %store_file.display(), settings = %claude_settings.display(), "resolved paths");

        Ok(Self {
            store_file,
            claude_dir,
            claude_settings,
        })
    }
}

fn default_store_file() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to get executable path")?;
    let dir = exe
        .parent()
        .context("Executable path has no parent directory")?;
    Ok(dir.join(STORE_FILE_NAME))
}
