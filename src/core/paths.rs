//! Well-known locations inside a project checkout.

use std::path::{Path, PathBuf};

/// Project-local config file name.
pub const CONFIG_FILE: &str = "shopdev.json";

/// Default management script, also used as the project root marker.
pub const MANAGE_SCRIPT: &str = "manage.py";

pub const FULL_TXT: &str = "full.txt";
pub const BASE_TXT: &str = "base.txt";
pub const DEV_TXT: &str = "dev.txt";

/// Project config file path
pub fn config_file(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Requirements directory (relative dirs resolve against the project root)
pub fn requirements_dir(root: &Path, dir: &str) -> PathBuf {
    let expanded = shellexpand::tilde(dir);
    let dir = Path::new(expanded.as_ref());
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        root.join(dir)
    }
}

/// Frozen package list
pub fn full_txt(requirements_dir: &Path) -> PathBuf {
    requirements_dir.join(FULL_TXT)
}

/// Runtime package list
pub fn base_txt(requirements_dir: &Path) -> PathBuf {
    requirements_dir.join(BASE_TXT)
}

/// Development package list
pub fn dev_txt(requirements_dir: &Path) -> PathBuf {
    requirements_dir.join(DEV_TXT)
}

/// Directory of a dotted Python module path (`apps.orders` -> `<root>/apps/orders`)
pub fn module_dir(root: &Path, dotted: &str) -> PathBuf {
    dotted.split('.').fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Source file of a dotted Python module path (`config.settings.test` -> `<root>/config/settings/test.py`)
pub fn module_file(root: &Path, dotted: &str) -> PathBuf {
    let mut path = module_dir(root, dotted);
    path.set_extension("py");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirements_dir_is_relative_to_root() {
        let root = Path::new("/srv/shop");
        assert_eq!(
            requirements_dir(root, "requirements"),
            PathBuf::from("/srv/shop/requirements")
        );
        assert_eq!(
            requirements_dir(root, "/opt/reqs"),
            PathBuf::from("/opt/reqs")
        );
    }

    #[test]
    fn module_paths_follow_dotted_names() {
        let root = Path::new("/srv/shop");
        assert_eq!(
            module_dir(root, "apps.orders"),
            PathBuf::from("/srv/shop/apps/orders")
        );
        assert_eq!(
            module_file(root, "config.settings.test"),
            PathBuf::from("/srv/shop/config/settings/test.py")
        );
    }
}
