//! File binding service: reading and writing document contents.
//!
//! Pure disk I/O, no session or UI knowledge. Callers (the dispatcher) decide
//! what a failure means for in-memory state; this crate only guarantees that a
//! failed write never damages the destination file. Writes go to a temporary
//! sibling first and are renamed into place, so the destination either keeps
//! its previous contents or holds the complete new contents.
//!
//! Content is read and written byte-for-byte: no line-ending normalization,
//! no trailing-newline fixups. What was saved is what a later read returns.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Failure taxonomy for document I/O. Every variant is recoverable; these are
/// surfaced to the user as dismissable notifications, never process-fatal.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },
    #[error("disk full while writing {path}")]
    DiskFull { path: PathBuf },
    #[error("{path} is not valid UTF-8 text")]
    Decode { path: PathBuf },
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => FileError::NotFound { path },
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            io::ErrorKind::StorageFull => FileError::DiskFull { path },
            _ => FileError::Io { path, source },
        }
    }
}

/// Read the full contents of `path` as UTF-8 text.
pub fn read_document(path: &Path) -> Result<String, FileError> {
    let bytes = std::fs::read(path).map_err(|e| {
        error!(target: "io", file = %path.display(), error = %e, "file_read_error");
        FileError::from_io(path, e)
    })?;
    match String::from_utf8(bytes) {
        Ok(content) => {
            debug!(
                target: "io",
                file = %path.display(),
                size_bytes = content.len(),
                "file_read_ok"
            );
            Ok(content)
        }
        Err(_) => {
            error!(target: "io", file = %path.display(), "file_decode_error");
            Err(FileError::Decode {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Write `content` to `path`, fully replacing prior contents.
///
/// The content lands in a temporary sibling which is renamed over the
/// destination, so an interrupted or failed write leaves the previous file
/// untouched. The temporary is cleaned up on failure.
pub fn write_document(path: &Path, content: &str) -> Result<(), FileError> {
    let tmp = staging_path(path);
    if let Err(e) = std::fs::write(&tmp, content.as_bytes()) {
        error!(target: "io", file = %path.display(), error = %e, "file_write_error");
        let _ = std::fs::remove_file(&tmp);
        return Err(FileError::from_io(path, e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        error!(target: "io", file = %path.display(), error = %e, "file_rename_error");
        let _ = std::fs::remove_file(&tmp);
        return Err(FileError::from_io(path, e));
    }
    debug!(
        target: "io",
        file = %path.display(),
        size_bytes = content.len(),
        "file_write_ok"
    );
    Ok(())
}

/// Temporary sibling used during [`write_document`]. Same directory as the
/// destination so the final rename never crosses a filesystem boundary.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "document".into());
    name.push(".quill-tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_content_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        for content in [
            "",
            "single line no newline",
            "unix\nlines\n",
            "mixed\r\nline\nendings\rhere\r\n",
            "unicode: héllo wörld ✓\n",
        ] {
            write_document(&path, content).unwrap();
            assert_eq!(read_document(&path).unwrap(), content);
        }
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }

    #[test]
    fn read_non_utf8_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.dat");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, FileError::Decode { .. }));
    }

    #[test]
    fn failed_write_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // Destination inside a directory that does not exist: the staging
        // write fails before anything could touch a real destination.
        let path = dir.path().join("no_such_dir").join("doc.txt");
        assert!(write_document(&path, "data").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn overwrite_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        write_document(&path, "first version").unwrap();
        write_document(&path, "second").unwrap();
        assert_eq!(read_document(&path).unwrap(), "second");
    }

    #[test]
    fn no_staging_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        write_document(&path, "content").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("doc.txt")]);
    }
}
