//! File writing for generated artifacts.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write a file atomically with the given Unix mode, creating parent directories as needed.
///
/// Content goes to a temporary file in the same directory, which is then
/// renamed over `path`. An interrupted run leaves either the old file or the
/// new one, never a truncated unit.
///
/// # Arguments
/// * `path` - Destination file
/// * `content` - Content to write
/// * `mode` - Unix permission bits (e.g., 0o644, 0o755)
pub fn write_file_atomic<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
    mode: u32,
) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("creating directory {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temporary file in {}", parent.display()))?;
    tmp.write_all(content.as_ref())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_sets_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/setup.sh");

        write_file_atomic(&path, "#!/bin/sh\n", 0o755).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\n");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo.service");

        write_file_atomic(&path, "old", 0o644).unwrap();
        write_file_atomic(&path, "new", 0o644).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        // No temporary files left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
