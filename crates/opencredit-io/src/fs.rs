//! Whole-file replacement on the local filesystem.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Replace `path` with `bytes`.
///
/// The bytes land in a sibling temporary file first and are renamed over the
/// target, so readers see either the previous report or the complete new one.
pub fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Output(format!("{} has no file name", path.display())))?;
    let tmp = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let result = (|| -> std::io::Result<()> {
        let mut f = File::create(&tmp)?;
        f.write_all(bytes)?;
        f.flush()?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file_entirely() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("report.csv");
        fs::write(&target, "a much longer previous report body").unwrap();

        write_replace(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        let leftovers: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out/nested/report.csv");
        write_replace(&target, b"x").unwrap();
        assert!(target.is_file());
    }
}
