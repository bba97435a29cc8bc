//! Filesystem utility functions
//!
//! Both files ccc writes (the profile store and Claude's settings.json) hold API
//! keys, so every write goes through [`write_private`].

use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Number of settings backups to keep
pub const MAX_BACKUPS: usize = 10;

/// Write `content` to `path` readable and writable by the owner only.
///
/// The data is written to a sibling `.tmp` file which is then renamed over the
/// target, so readers never observe a half-written file. A symlinked `path` is
/// followed and the file it points at is replaced, the link itself stays.
pub fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = resolve_link(path)?;
    let temp_path = temp_path_for(&target);

    // A leftover temp file would keep its old mode through the rename
    match fs::remove_file(&temp_path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let result = (|| -> io::Result<()> {
        let mut file = options.open(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Follow `path` to the file it names when it is a symlink.
///
/// A dangling link is resolved against the link's directory so the write
/// creates the missing target.
fn resolve_link(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(resolved) => Ok(resolved),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let link = fs::read_link(path)?;
                Ok(path.parent().map(|dir| dir.join(&link)).unwrap_or(link))
            }
            Err(e) => Err(e),
        },
        _ => Ok(path.to_path_buf()),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Copy `path` to `<name>.<timestamp>.bak` in the same directory.
///
/// Only the newest [`MAX_BACKUPS`] backups of that file are kept. Returns the
/// backup location, or `None` when there was nothing to back up.
pub fn backup_file(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }

    let (Some(dir), Some(file_name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
    else {
        return Ok(None);
    };

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = dir.join(format!("{}.{}.bak", file_name, timestamp));
    fs::copy(path, &backup_path)?;

    cleanup_old_backups(dir, file_name)?;

    Ok(Some(backup_path))
}

fn cleanup_old_backups(dir: &Path, name_prefix: &str) -> io::Result<()> {
    let prefix = format!("{}.", name_prefix);
    let mut backups: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".bak"))
        })
        .collect();

    if backups.len() <= MAX_BACKUPS {
        return Ok(());
    }

    // Oldest first
    backups.sort_by_key(|b| b.metadata().and_then(|m| m.modified()).ok());

    let to_remove = backups.len() - MAX_BACKUPS;
    for entry in backups.iter().take(to_remove) {
        fs::remove_file(entry.path())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_private_creates_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        write_private(&path, b"first").unwrap();
        write_private(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("store.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"{}").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_ignores_stale_temp_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ccc-config.json");
        let stale = temp_dir.path().join("ccc-config.json.tmp");
        fs::write(&stale, "half written").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!stale.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_follows_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("dotfiles-settings.json");
        let link = temp_dir.path().join("settings.json");
        fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_private(&link, b"new").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new");
        assert_eq!(fs::read_to_string(&link).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_dangling_symlink_creates_target() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("settings.json");
        std::os::unix::fs::symlink("profiles-settings.json", &link).unwrap();

        write_private(&link, b"{}").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("profiles-settings.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_write_private_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("store.json");
        assert!(write_private(&path, b"{}").is_err());
    }

    #[test]
    fn test_backup_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        assert!(backup_file(&path).unwrap().is_none());

        fs::write(&path, "not json").unwrap();
        let backup = backup_file(&path).unwrap().unwrap();
        assert!(backup.file_name().unwrap().to_str().unwrap().starts_with("settings.json."));
        assert_eq!(fs::read_to_string(backup).unwrap(), "not json");
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..(MAX_BACKUPS + 3) {
            fs::write(
                temp_dir.path().join(format!("settings.json.2024010{}_0000{:02}.bak", i % 10, i)),
                "x",
            )
            .unwrap();
        }

        cleanup_old_backups(temp_dir.path(), "settings.json").unwrap();

        let count = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(count, MAX_BACKUPS);
    }
}
