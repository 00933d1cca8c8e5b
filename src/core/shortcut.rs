//! Shortcut names and the commands they stand for.
//!
//! Every shortcut maps to exactly one external program plus fixed leading
//! arguments. Passthrough arguments are appended verbatim, in order, with no
//! validation or rewriting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::defaults::Defaults;
use crate::error::Error;
use crate::project::Project;
use crate::utils::shell;

/// Environment variable the framework reads to pick a settings module.
pub const SETTINGS_ENV: &str = "DJANGO_SETTINGS_MODULE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutName {
    Make,
    Mig,
    Run,
    Shell,
    Test,
    Check,
    Pre,
}

impl ShortcutName {
    pub const ALL: [ShortcutName; 7] = [
        ShortcutName::Make,
        ShortcutName::Mig,
        ShortcutName::Run,
        ShortcutName::Shell,
        ShortcutName::Test,
        ShortcutName::Check,
        ShortcutName::Pre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShortcutName::Make => "make",
            ShortcutName::Mig => "mig",
            ShortcutName::Run => "run",
            ShortcutName::Shell => "shell",
            ShortcutName::Test => "test",
            ShortcutName::Check => "check",
            ShortcutName::Pre => "pre",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ShortcutName::Make => "Create new migrations",
            ShortcutName::Mig => "Apply migrations",
            ShortcutName::Run => "Start the development server",
            ShortcutName::Shell => "Open the framework shell",
            ShortcutName::Test => "Run the test suite",
            ShortcutName::Check => "Run the framework system checks",
            ShortcutName::Pre => "Run pre-commit hooks on all files",
        }
    }

    /// Management subcommand for shortcuts that go through the management script.
    fn manage_command(&self) -> Option<&'static str> {
        match self {
            ShortcutName::Make => Some("makemigrations"),
            ShortcutName::Mig => Some("migrate"),
            ShortcutName::Run => Some("runserver"),
            ShortcutName::Shell => Some("shell"),
            ShortcutName::Check => Some("check"),
            ShortcutName::Test | ShortcutName::Pre => None,
        }
    }
}

impl fmt::Display for ShortcutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flavour of the `test` shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestVariant {
    /// Runner with no extra flags
    Plain,
    /// Runner with the test settings module and database reuse
    #[default]
    Reuse,
}

impl FromStr for TestVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(TestVariant::Plain),
            "reuse" => Ok(TestVariant::Reuse),
            other => Err(Error::validation_invalid_argument(
                "variant",
                format!("Unknown test variant '{}'", other),
                None,
                Some(vec!["plain".to_string(), "reuse".to_string()]),
            )),
        }
    }
}

/// Fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: PathBuf) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-quoted command line, for display and dry runs.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        shell::quote_args(&parts)
    }
}

/// Resolve `name` against the project's configuration.
///
/// Runs in `cwd`, the caller's directory, with the management script given as
/// an absolute path. `variant` overrides the configured test variant and is
/// ignored by every other shortcut.
pub fn resolve(
    name: ShortcutName,
    project: &Project,
    cwd: &Path,
    variant: Option<TestVariant>,
    passthrough: &[String],
) -> Invocation {
    let defaults = project.defaults();
    let script = project.manage_script().display().to_string();
    let base = base_invocation(name, defaults, &script, variant, cwd.to_path_buf());

    let base = match defaults.settings_module.as_deref() {
        Some(module) if !module.is_empty() => base.env(SETTINGS_ENV, module),
        _ => base,
    };

    base.args(passthrough.iter().cloned())
}

fn base_invocation(
    name: ShortcutName,
    defaults: &Defaults,
    manage_script: &str,
    variant: Option<TestVariant>,
    cwd: PathBuf,
) -> Invocation {
    if let Some(command) = name.manage_command() {
        return Invocation::new(&defaults.python, cwd)
            .arg(manage_script)
            .arg(command);
    }

    match name {
        ShortcutName::Test => {
            let runner = Invocation::new(&defaults.test.runner, cwd);
            match variant.unwrap_or(defaults.test.variant) {
                TestVariant::Plain => runner,
                TestVariant::Reuse => runner
                    .arg(format!("--ds={}", defaults.test.settings_module))
                    .arg("--reuse-db"),
            }
        }
        _ => Invocation::new(&defaults.lint.program, cwd).args(defaults.lint.args.iter().cloned()),
    }
}

/// Human-readable template for `name`, with `<args>` standing in for passthrough.
pub fn template(name: ShortcutName, defaults: &Defaults, variant: Option<TestVariant>) -> String {
    let invocation = base_invocation(name, defaults, &defaults.manage_script, variant, PathBuf::new());
    format!("{} <args>", invocation.command_line())
}
