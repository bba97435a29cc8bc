use std::io::ErrorKind;
use std::path::Path;

use crate::activation::ActivationTarget;
use crate::error::{ProfileError, Result};
use crate::fs_utils::write_private;
use crate::paths::Paths;
use crate::profiles::ProfileCollection;

/// Result of loading the profile store
#[derive(Debug)]
pub struct Loaded {
    pub profiles: ProfileCollection,
    /// Name of the profile imported on first run, once it has been saved
    pub imported: Option<String>,
}

impl ProfileCollection {
    /// Read the store, returning `None` if the file doesn't exist
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ProfileError::io("failed to read config file", path, e)),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| ProfileError::CorruptStore {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write the store, owner-readable only.
    ///
    /// Uses an atomic write (temp file, then rename) so a crash never leaves a
    /// truncated store behind.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ProfileError::io("failed to create config directory", parent, e))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ProfileError::Serialize("config", e))?;

        write_private(path, content.as_bytes())
            .map_err(|e| ProfileError::io("failed to write config file", path, e))?;

        tracing::debug!(path = %path.display(), profiles = self.len(), "saved config file");
        Ok(())
    }
}

/// Load the profile store.
///
/// When no store exists yet, credentials already configured at `target` are
/// imported as the single active profile and saved right away.
pub fn load(paths: &Paths, target: &ActivationTarget) -> Result<Loaded> {
    if let Some(profiles) = ProfileCollection::read(&paths.store_file)? {
        tracing::debug!(path = %paths.store_file.display(), profiles = profiles.len(), "loaded config file");
        return Ok(Loaded {
            profiles,
            imported: None,
        });
    }

    let Some(profile) = target.import_existing() else {
        tracing::debug!(path = %paths.store_file.display(), "no config file, starting empty");
        return Ok(Loaded {
            profiles: ProfileCollection::new(),
            imported: None,
        });
    };

    let name = profile.name.clone();
    let profiles = ProfileCollection::with_active(profile);

    let imported = match profiles.write(&paths.store_file) {
        Ok(()) => Some(name),
        Err(e) => {
            tracing::warn!(error = %e, "could not save imported configuration");
            None
        }
    };

    Ok(Loaded { profiles, imported })
}

/// Save the profile store
pub fn save(paths: &Paths, profiles: &ProfileCollection) -> Result<()> {
    profiles.write(&paths.store_file)
}
