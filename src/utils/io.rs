//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read file contents, mapping failures to `internal.io_error` with `operation` as context.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content next to `path` and rename it into place.
///
/// Readers see either the previous file or the complete new one.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let io_err = |e: std::io::Error, step: &str| {
        Error::internal_io(e.to_string(), Some(format!("{} ({})", operation, step)))
    };

    let file_name = path.file_name().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    })?;
    let tmp_path = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    fs::write(&tmp_path, content).map_err(|e| io_err(e, "write temp"))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e, "rename"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_file_reports_operation_on_failure() {
        let err = read_file(Path::new("/nonexistent/full.txt"), "read full.txt").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(err.details["context"], "read full.txt");
    }

    #[test]
    fn atomic_write_replaces_content_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("base.txt");
        fs::write(&path, "old\n").unwrap();

        write_file_atomic(&path, "Django==5.0.6\n", "write base.txt").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Django==5.0.6\n");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn atomic_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("dev.txt");

        let err = write_file_atomic(&path, "-r base.txt\n", "write dev.txt").unwrap_err();
        assert_eq!(err.details["context"], "write dev.txt (write temp)");
    }
}
