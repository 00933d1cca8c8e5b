//! Project root discovery and loaded configuration.

use std::path::{Path, PathBuf};

use crate::defaults::{self, Defaults, ShopdevConfig};
use crate::error::{Error, Result};
use crate::paths;

/// A located project checkout with its effective configuration.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: ShopdevConfig,
}

/// How to locate the project.
#[derive(Debug, Clone, Default)]
pub struct Locate {
    /// Explicit project root; skips discovery
    pub root: Option<String>,
    /// Explicit config file; defaults to `<root>/shopdev.json`
    pub config: Option<String>,
}

impl Project {
    pub fn defaults(&self) -> &Defaults {
        &self.config.defaults
    }

    /// Absolute path of the management script.
    pub fn manage_script(&self) -> PathBuf {
        self.root.join(&self.config.defaults.manage_script)
    }

    pub fn requirements_dir(&self) -> PathBuf {
        paths::requirements_dir(&self.root, &self.config.defaults.requirements.dir)
    }
}

/// Locate the project starting from `cwd` and load its config.
pub fn locate(cwd: &Path, opts: &Locate) -> Result<Project> {
    let (root, config_path) = resolve_paths(cwd, opts)?;
    let config = defaults::load_config(&config_path)?;
    tracing::debug!(root = %root.display(), "project located");

    Ok(Project {
        root,
        config_path,
        config,
    })
}

/// Project root and config file path, without reading the config.
pub fn resolve_paths(cwd: &Path, opts: &Locate) -> Result<(PathBuf, PathBuf)> {
    let root = match opts.root.as_deref() {
        Some(dir) => {
            let root = absolute(cwd, dir);
            if !root.is_dir() {
                return Err(Error::validation_invalid_argument(
                    "project",
                    format!("Not a directory: {}", root.display()),
                    None,
                    None,
                ));
            }
            root
        }
        None => discover_root(cwd)?,
    };

    let config_path = match opts.config.as_deref() {
        Some(path) => absolute(cwd, path),
        None => paths::config_file(&root),
    };

    Ok((root, config_path))
}

/// Walk up from `start` to the nearest directory holding `shopdev.json` or `manage.py`.
pub fn discover_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            paths::config_file(dir).is_file() || dir.join(paths::MANAGE_SCRIPT).is_file()
        })
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            Error::project_root_not_found(start.display().to_string(), paths::MANAGE_SCRIPT)
        })
}

fn absolute(cwd: &Path, path: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}
