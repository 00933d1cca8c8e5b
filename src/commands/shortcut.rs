use clap::Args;
use serde::Serialize;

use shopdev::runner;
use shopdev::shortcut::{self, Invocation, ShortcutName};

use super::{CmdResult, GlobalArgs};

#[derive(Args, Debug)]
pub struct ShortcutArgs {
    /// Arguments forwarded verbatim to the wrapped command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

#[derive(Serialize)]
pub struct ShortcutOutput {
    command: String,
    shortcut: ShortcutName,
    dry_run: bool,
    command_line: String,
    invocation: Invocation,
}

fn resolve(name: ShortcutName, args: &ShortcutArgs, global: &GlobalArgs) -> shopdev::Result<Invocation> {
    let cwd = super::current_dir()?;
    let project = global.project_at(&cwd)?;
    Ok(shortcut::resolve(
        name,
        &project,
        &cwd,
        global.test_variant,
        &args.args,
    ))
}

/// Run the shortcut with the terminal attached; the result is the wrapped command's exit code.
pub fn run_passthrough(name: ShortcutName, args: ShortcutArgs, global: &GlobalArgs) -> shopdev::Result<i32> {
    let invocation = resolve(name, &args, global)?;
    tracing::info!(shortcut = %name, command = %invocation.command_line(), "running shortcut");
    runner::run_passthrough(&invocation)
}

/// Resolve without spawning.
pub fn dry_run(name: ShortcutName, args: ShortcutArgs, global: &GlobalArgs) -> CmdResult<ShortcutOutput> {
    let invocation = resolve(name, &args, global)?;

    Ok((
        ShortcutOutput {
            command: format!("shortcut.{}", name),
            shortcut: name,
            dry_run: true,
            command_line: invocation.command_line(),
            invocation,
        },
        0,
    ))
}
