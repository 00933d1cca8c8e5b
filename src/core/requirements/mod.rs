//! Freezing installed packages and splitting them into base/dev lists.

mod split;

pub use split::{split, BaseMatcher, RequirementsSplit, DEV_HEADER};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::project::Project;
use crate::runner;
use crate::shortcut::Invocation;
use crate::utils::io;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeResult {
    pub path: PathBuf,
    pub packages: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResult {
    pub source: PathBuf,
    pub base_path: PathBuf,
    pub dev_path: PathBuf,
    pub base_count: usize,
    pub dev_count: usize,
}

/// The freeze command for this project.
pub fn freeze_invocation(project: &Project) -> Invocation {
    Invocation::new(&project.defaults().python, project.root.clone())
        .args(["-m", "pip", "freeze"])
}

/// Run the package manager's freeze and write its stdout verbatim to `full.txt`.
pub fn freeze(project: &Project) -> Result<FreezeResult> {
    let dir = project.requirements_dir();
    let frozen = runner::run_captured(&freeze_invocation(project))?;
    write_frozen(&dir, &frozen)
}

/// Write freeze output to `<dir>/full.txt`.
pub fn write_frozen(dir: &Path, frozen: &str) -> Result<FreezeResult> {
    ensure_dir(dir)?;
    let path = paths::full_txt(dir);
    io::write_file_atomic(&path, frozen, &format!("write {}", path.display()))?;

    let packages = frozen.lines().filter(|line| !line.trim().is_empty()).count();
    crate::log_status!("reqs", "Froze {} packages to {}", packages, path.display());

    Ok(FreezeResult { path, packages })
}

/// Split `<dir>/full.txt` into `<dir>/base.txt` and `<dir>/dev.txt`.
pub fn split_dir(dir: &Path, base_packages: &[String]) -> Result<SplitResult> {
    let source = paths::full_txt(dir);
    if !source.is_file() {
        return Err(Error::requirements_not_found(source.display().to_string()));
    }

    let frozen = io::read_file(&source, &format!("read {}", source.display()))?;
    let matcher = BaseMatcher::new(base_packages)?;
    let result = split(&frozen, &matcher);

    let base_path = paths::base_txt(dir);
    let dev_path = paths::dev_txt(dir);
    io::write_file_atomic(&base_path, &result.base_text(), &format!("write {}", base_path.display()))?;
    io::write_file_atomic(&dev_path, &result.dev_text(), &format!("write {}", dev_path.display()))?;

    tracing::debug!(base = result.base.len(), dev = result.dev.len(), "requirements split");
    crate::log_status!(
        "reqs",
        "{} base / {} dev lines written to {}",
        result.base.len(),
        result.dev.len(),
        dir.display()
    );

    Ok(SplitResult {
        source,
        base_path,
        dev_path,
        base_count: result.base.len(),
        dev_count: result.dev.len(),
    })
}

/// Split the project's frozen requirements.
pub fn split_project(project: &Project) -> Result<SplitResult> {
    split_dir(
        &project.requirements_dir(),
        &project.defaults().requirements.base_packages,
    )
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("create {}", dir.display()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use tempfile::TempDir;

    fn base_packages() -> Vec<String> {
        builtin_defaults().requirements.base_packages
    }

    #[test]
    fn split_dir_writes_both_files() {
        let dir = TempDir::new().unwrap();
        write_frozen(dir.path(), "Django==5.0.6\npytest==8.2.0\n").unwrap();

        let result = split_dir(dir.path(), &base_packages()).unwrap();
        assert_eq!(result.base_count, 1);
        assert_eq!(result.dev_count, 1);
        assert_eq!(fs::read_to_string(&result.base_path).unwrap(), "Django==5.0.6\n");
        assert_eq!(
            fs::read_to_string(&result.dev_path).unwrap(),
            "-r base.txt\npytest==8.2.0\n"
        );
    }

    #[test]
    fn split_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_frozen(
            dir.path(),
            "asgiref==3.8.1\nDjango==5.0.6\nwhitenoise==6.7.0\npytest==8.2.0\n",
        )
        .unwrap();

        split_dir(dir.path(), &base_packages()).unwrap();
        let base_first = fs::read(paths::base_txt(dir.path())).unwrap();
        let dev_first = fs::read(paths::dev_txt(dir.path())).unwrap();

        split_dir(dir.path(), &base_packages()).unwrap();
        assert_eq!(fs::read(paths::base_txt(dir.path())).unwrap(), base_first);
        assert_eq!(fs::read(paths::dev_txt(dir.path())).unwrap(), dev_first);
    }

    #[test]
    fn split_dir_overwrites_previous_output() {
        let dir = TempDir::new().unwrap();
        fs::write(paths::base_txt(dir.path()), "stale==0.1\n").unwrap();
        write_frozen(dir.path(), "pytest==8.2.0\n").unwrap();

        split_dir(dir.path(), &base_packages()).unwrap();
        assert_eq!(fs::read_to_string(paths::base_txt(dir.path())).unwrap(), "");
    }

    #[test]
    fn split_dir_without_frozen_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = split_dir(dir.path(), &base_packages()).unwrap_err();
        assert_eq!(err.code.as_str(), "requirements.not_found");
    }

    #[test]
    fn write_frozen_creates_directory_and_counts_packages() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("requirements");

        let result = write_frozen(&nested, "Django==5.0.6\n\npytest==8.2.0\n").unwrap();
        assert_eq!(result.packages, 2);
        assert_eq!(result.path, nested.join("full.txt"));
        assert!(result.path.is_file());
    }
}
