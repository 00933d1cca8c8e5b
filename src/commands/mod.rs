use std::env;
use std::path::{Path, PathBuf};

use shopdev::project::{self, Locate, Project};
use shopdev::shortcut::{ShortcutName, TestVariant};

pub type CmdResult<T> = shopdev::Result<(T, i32)>;

/// Flags accepted before the subcommand.
#[derive(Debug, Default)]
pub(crate) struct GlobalArgs {
    pub project: Option<String>,
    pub config: Option<String>,
    pub dry_run: bool,
    pub test_variant: Option<TestVariant>,
}

impl GlobalArgs {
    fn locate_opts(&self) -> Locate {
        Locate {
            root: self.project.clone(),
            config: self.config.clone(),
        }
    }

    /// Locate the project from the current directory, honouring --project/--config.
    pub fn project(&self) -> shopdev::Result<Project> {
        self.project_at(&current_dir()?)
    }

    pub fn project_at(&self, cwd: &Path) -> shopdev::Result<Project> {
        project::locate(cwd, &self.locate_opts())
    }

    /// Project root and config path, without loading the config.
    pub fn project_paths(&self) -> shopdev::Result<(PathBuf, PathBuf)> {
        project::resolve_paths(&current_dir()?, &self.locate_opts())
    }
}

pub(crate) fn current_dir() -> shopdev::Result<PathBuf> {
    env::current_dir().map_err(|e| {
        shopdev::Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })
}

pub fn parse_test_variant(s: &str) -> Result<TestVariant, String> {
    s.parse::<TestVariant>().map_err(|_| {
        format!("invalid test variant `{s}` (expected `plain` or `reuse`)")
    })
}

pub mod config;
pub mod doctor;
pub mod reqs;
pub mod shortcut;
pub mod shortcuts;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

/// Shortcuts only reach JSON mode as dry runs.
macro_rules! dry_run {
    ($name:ident, $args:expr, $global:expr) => {
        crate::output::map_cmd_result_to_json(shortcut::dry_run(
            ShortcutName::$name,
            $args,
            $global,
        ))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (shopdev::Result<serde_json::Value>, i32) {
    crate::tty::status("shopdev is working...");

    match command {
        crate::Commands::Reqs(args) => dispatch!(args, global, reqs),
        crate::Commands::Doctor(args) => dispatch!(args, global, doctor),
        crate::Commands::Shortcuts => dispatch!((), global, shortcuts),
        crate::Commands::Config(args) => dispatch!(args, global, config),

        crate::Commands::Make(args) => dry_run!(Make, args, global),
        crate::Commands::Mig(args) => dry_run!(Mig, args, global),
        crate::Commands::Run(args) => dry_run!(Run, args, global),
        crate::Commands::Shell(args) => dry_run!(Shell, args, global),
        crate::Commands::Test(args) => dry_run!(Test, args, global),
        crate::Commands::Check(args) => dry_run!(Check, args, global),
        crate::Commands::Pre(args) => dry_run!(Pre, args, global),
    }
}
