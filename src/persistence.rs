//! File persistence helpers shared by the settings file and the profile file.

use crate::error::ApiError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read a file, treating a missing file as `None`.
pub fn read_optional(path: &Path) -> Result<Option<String>, ApiError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ApiError::Persistence(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Replace `path` with `contents` without ever exposing a partially written file.
///
/// The data goes to a sibling temp file that is synced and then renamed over
/// the target. On failure the temp file is removed and the previous file is
/// left as it was.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ApiError> {
    let parent = path.parent().ok_or_else(|| {
        ApiError::Persistence(format!("{} has no parent directory", path.display()))
    })?;
    fs::create_dir_all(parent).map_err(|e| {
        ApiError::Persistence(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let temp_path = temp_path_for(path);
    let result = write_temp(&temp_path, contents).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| {
            ApiError::Persistence(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            ))
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, contents: &[u8]) -> Result<(), ApiError> {
    let to_err = |e: std::io::Error| {
        ApiError::Persistence(format!("Failed to write {}: {}", temp_path.display(), e))
    };

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(to_err)?;
    restrict_permissions(temp_path)?;
    file.write_all(contents).map_err(to_err)?;
    file.sync_all().map_err(to_err)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let unique = uuid::Uuid::new_v4().simple().to_string();
    path.with_file_name(format!(".{}.{}.tmp", file_name, &unique[..12]))
}

/// Settings and profiles hold credentials in plain text; keep them owner-only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ApiError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        ApiError::Persistence(format!(
            "Failed to set permissions on {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ApiError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config").join("settings.json");

        write_atomic(&path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn replaces_existing_content_and_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profiles.json");

        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[1,2]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1,2]");
        assert_eq!(entries(temp.path()), vec!["profiles.json".to_string()]);
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        write_atomic(&path, b"old").unwrap();

        // A directory cannot be replaced by a file rename.
        let blocked = temp.path().join("blocked");
        fs::create_dir_all(blocked.join("child")).unwrap();
        assert!(write_atomic(&blocked, b"new").is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(
            entries(temp.path()),
            vec!["blocked".to_string(), "settings.json".to_string()]
        );
    }

    #[test]
    fn read_optional_handles_missing_files() {
        let temp = TempDir::new().unwrap();
        assert!(read_optional(&temp.path().join("absent.json")).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        write_atomic(&path, b"{}").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
