use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::shortcut::TestVariant;
use crate::utils::io;

/// Root configuration structure for shopdev.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShopdevConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via shopdev.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    /// Interpreter used for the management script and `pip freeze`
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_manage_script")]
    pub manage_script: String,

    /// Exported as DJANGO_SETTINGS_MODULE for every shortcut when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_module: Option<String>,

    #[serde(default = "default_test")]
    pub test: TestConfig,

    #[serde(default = "default_lint")]
    pub lint: LintConfig,

    #[serde(default = "default_requirements")]
    pub requirements: RequirementsConfig,

    #[serde(default = "default_doctor")]
    pub doctor: DoctorConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            python: default_python(),
            manage_script: default_manage_script(),
            settings_module: None,
            test: default_test(),
            lint: default_lint(),
            requirements: default_requirements(),
            doctor: default_doctor(),
        }
    }
}

/// Test runner invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestConfig {
    #[serde(default = "default_test_runner")]
    pub runner: String,

    #[serde(default)]
    pub variant: TestVariant,

    /// Settings module handed to the runner by the `reuse` variant
    #[serde(default = "default_test_settings")]
    pub settings_module: String,
}

/// Pre-commit style linter invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LintConfig {
    #[serde(default = "default_lint_program")]
    pub program: String,

    #[serde(default = "default_lint_args")]
    pub args: Vec<String>,
}

/// Requirements freezing and splitting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequirementsConfig {
    #[serde(default = "default_requirements_dir")]
    pub dir: String,

    /// Case-sensitive name prefixes that select runtime packages
    #[serde(default = "default_base_packages")]
    pub base_packages: Vec<String>,
}

/// Project health checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorConfig {
    #[serde(default = "default_required_apps")]
    pub required_apps: Vec<String>,

    #[serde(default = "default_settings_modules")]
    pub settings_modules: Vec<String>,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_python() -> String {
    "python".to_string()
}

fn default_manage_script() -> String {
    crate::paths::MANAGE_SCRIPT.to_string()
}

fn default_test() -> TestConfig {
    TestConfig {
        runner: default_test_runner(),
        variant: TestVariant::default(),
        settings_module: default_test_settings(),
    }
}

fn default_test_runner() -> String {
    "pytest".to_string()
}

fn default_test_settings() -> String {
    "config.settings.test".to_string()
}

fn default_lint() -> LintConfig {
    LintConfig {
        program: default_lint_program(),
        args: default_lint_args(),
    }
}

fn default_lint_program() -> String {
    "pre-commit".to_string()
}

fn default_lint_args() -> Vec<String> {
    vec!["run".to_string(), "--all-files".to_string()]
}

fn default_requirements() -> RequirementsConfig {
    RequirementsConfig {
        dir: default_requirements_dir(),
        base_packages: default_base_packages(),
    }
}

fn default_requirements_dir() -> String {
    "requirements".to_string()
}

fn default_base_packages() -> Vec<String> {
    [
        "Django",
        "dj-database-url",
        "python-dotenv",
        "whitenoise",
        "django-extensions",
        "django-widget-tweaks",
        "Pillow",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_doctor() -> DoctorConfig {
    DoctorConfig {
        required_apps: default_required_apps(),
        settings_modules: default_settings_modules(),
    }
}

fn default_required_apps() -> Vec<String> {
    vec!["apps.payments".to_string(), "apps.orders".to_string()]
}

fn default_settings_modules() -> Vec<String> {
    vec![
        "config.settings.base".to_string(),
        "config.settings.test".to_string(),
    ]
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load config from `path`, falling back to built-in defaults when the file is absent.
///
/// A file that exists but does not parse, or carries empty program names, is an error.
pub fn load_config(path: &Path) -> Result<ShopdevConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using built-in defaults");
        return Ok(ShopdevConfig::default());
    }

    let content = io::read_file(path, &format!("read {}", path.display()))?;
    let config: ShopdevConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    validate(&config.defaults)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Save config (creates the parent directory if missing).
pub fn save_config(path: &Path, config: &ShopdevConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize shopdev.json".to_string())))?;

    io::write_file_atomic(path, &format!("{}\n", content), &format!("write {}", path.display()))
}

/// Return a copy of `config` with the value at JSON `pointer` replaced.
///
/// The parent of the pointer must already exist; the result must still
/// deserialize and validate as a config.
pub fn set_pointer(config: &ShopdevConfig, pointer: &str, value: Value) -> Result<ShopdevConfig> {
    let (parent, key) = split_pointer(pointer)?;

    let mut json = serde_json::to_value(config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))?;

    let slot = json.pointer_mut(parent).ok_or_else(|| {
        Error::validation_invalid_argument(
            "pointer",
            format!("No config section at '{}'", parent),
            Some(pointer.to_string()),
            None,
        )
    })?;

    match slot {
        Value::Object(map) => {
            map.insert(key, value);
        }
        Value::Array(items) => {
            let index = key
                .parse::<usize>()
                .ok()
                .filter(|i| *i < items.len())
                .ok_or_else(|| {
                    Error::validation_invalid_argument(
                        "pointer",
                        format!("Array index '{}' out of range", key),
                        Some(pointer.to_string()),
                        None,
                    )
                })?;
            items[index] = value;
        }
        _ => {
            return Err(Error::validation_invalid_argument(
                "pointer",
                format!("'{}' is not an object or array", parent),
                Some(pointer.to_string()),
                None,
            ));
        }
    }

    let updated: ShopdevConfig = serde_json::from_value(json)
        .map_err(|e| Error::validation_invalid_json(e, Some(format!("apply {}", pointer))))?;
    validate(&updated.defaults)?;
    Ok(updated)
}

fn split_pointer(pointer: &str) -> Result<(&str, String)> {
    let invalid = || {
        Error::validation_invalid_argument(
            "pointer",
            "JSON pointer must start with '/' and name a key",
            Some(pointer.to_string()),
            None,
        )
    };

    if !pointer.starts_with('/') {
        return Err(invalid());
    }

    let cut = pointer.rfind('/').ok_or_else(invalid)?;
    let key = &pointer[cut + 1..];
    if key.is_empty() {
        return Err(invalid());
    }

    Ok((&pointer[..cut], key.replace("~1", "/").replace("~0", "~")))
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

fn validate(defaults: &Defaults) -> Result<()> {
    let required = [
        ("python", &defaults.python),
        ("manage_script", &defaults.manage_script),
        ("test.runner", &defaults.test.runner),
        ("lint.program", &defaults.lint.program),
        ("requirements.dir", &defaults.requirements.dir),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(Error::config_invalid_value(
                key,
                Some(value.clone()),
                "must not be empty",
            ));
        }
    }

    if let Some(name) = defaults
        .requirements
        .base_packages
        .iter()
        .find(|name| name.trim().is_empty())
    {
        return Err(Error::config_invalid_value(
            "requirements.base_packages",
            Some(name.clone()),
            "package names must not be empty",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_builtin_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("shopdev.json")).unwrap();
        assert_eq!(config.defaults, builtin_defaults());
        assert_eq!(config.defaults.requirements.base_packages.len(), 7);
        assert_eq!(config.defaults.test.variant, TestVariant::Reuse);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shopdev.json");
        fs::write(
            &path,
            r#"{"defaults": {"python": "python3.12", "test": {"variant": "plain"}}}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.defaults.python, "python3.12");
        assert_eq!(config.defaults.test.variant, TestVariant::Plain);
        assert_eq!(config.defaults.test.runner, "pytest");
        assert_eq!(config.defaults.manage_script, "manage.py");
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shopdev.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_config(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn empty_program_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shopdev.json");
        fs::write(&path, r#"{"defaults": {"lint": {"program": "  "}}}"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "lint.program");
    }

    #[test]
    fn set_pointer_updates_nested_value() {
        let config = ShopdevConfig::default();
        let updated = set_pointer(
            &config,
            "/defaults/test/variant",
            Value::String("plain".to_string()),
        )
        .unwrap();
        assert_eq!(updated.defaults.test.variant, TestVariant::Plain);

        let updated = set_pointer(
            &updated,
            "/defaults/settings_module",
            Value::String("config.settings.dev".to_string()),
        )
        .unwrap();
        assert_eq!(
            updated.defaults.settings_module.as_deref(),
            Some("config.settings.dev")
        );
    }

    #[test]
    fn set_pointer_rejects_bad_paths_and_types() {
        let config = ShopdevConfig::default();

        let err = set_pointer(&config, "defaults/python", Value::Null).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");

        let err = set_pointer(&config, "/nope/python", Value::Null).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");

        let err = set_pointer(&config, "/defaults/test/variant", Value::Bool(true)).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_json");

        let err = set_pointer(&config, "/defaults/python", Value::String(String::new())).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn set_pointer_replaces_array_items() {
        let config = ShopdevConfig::default();
        let updated = set_pointer(
            &config,
            "/defaults/requirements/base_packages/6",
            Value::String("gunicorn".to_string()),
        )
        .unwrap();
        assert_eq!(updated.defaults.requirements.base_packages[6], "gunicorn");

        let err = set_pointer(&config, "/defaults/requirements/base_packages/7", Value::Null).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn save_then_load_preserves_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("shopdev.json");
        let mut config = ShopdevConfig::default();
        config.defaults.settings_module = Some("config.settings.dev".to_string());

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
