//! Runs resolved invocations as child processes.

use std::process::{Command, ExitStatus, Stdio};

use crate::error::{CommandFailedDetails, Error, Result};
use crate::shortcut::Invocation;
use crate::utils::command::error_text;

/// Exit code reported when the program could not be started (matches sh).
pub const SPAWN_FAILED_EXIT_CODE: i32 = 127;

fn build(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    if !invocation.cwd.as_os_str().is_empty() {
        cmd.current_dir(&invocation.cwd);
    }
    cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd
}

/// Run with stdin/stdout/stderr inherited from the terminal.
/// Returns the child's exit code unchanged.
pub fn run_passthrough(invocation: &Invocation) -> Result<i32> {
    tracing::debug!(command = %invocation.command_line(), cwd = %invocation.cwd.display(), "spawning");

    let status = build(invocation)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::command_spawn_failed(&invocation.program, e.to_string()))?;

    let code = exit_code(status);
    tracing::debug!(exit_code = code, "child exited");
    Ok(code)
}

/// Run with captured output and return stdout. A non-zero exit is an error.
pub fn run_captured(invocation: &Invocation) -> Result<String> {
    tracing::debug!(command = %invocation.command_line(), "capturing");

    let output = build(invocation)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::command_spawn_failed(&invocation.program, e.to_string()))?;

    if !output.status.success() {
        return Err(Error::command_failed(CommandFailedDetails {
            command: invocation.command_line(),
            exit_code: exit_code(output.status),
            stderr: error_text(&output),
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Map an exit status to a shell-style exit code (128 + signal when killed).
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh", PathBuf::new()).arg("-c").arg(script)
    }

    #[test]
    fn passthrough_returns_child_exit_code() {
        assert_eq!(run_passthrough(&sh("exit 0")).unwrap(), 0);
        assert_eq!(run_passthrough(&sh("exit 3")).unwrap(), 3);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let inv = Invocation::new("shopdev-no-such-program-xyz", PathBuf::new());
        let err = run_passthrough(&inv).unwrap_err();
        assert_eq!(err.code.as_str(), "command.spawn_failed");
    }

    #[test]
    fn captured_returns_stdout_verbatim() {
        let out = run_captured(&sh("printf 'a==1\\nb==2\\n'")).unwrap();
        assert_eq!(out, "a==1\nb==2\n");
    }

    #[test]
    fn captured_failure_carries_exit_code_and_stderr() {
        let err = run_captured(&sh("echo boom >&2; exit 4")).unwrap_err();
        assert_eq!(err.code.as_str(), "command.failed");
        assert_eq!(err.details["exitCode"], 4);
        assert_eq!(err.details["stderr"], "boom");
    }

    #[test]
    fn env_and_cwd_are_applied() {
        let dir = tempfile::TempDir::new().unwrap();
        let inv = Invocation::new("sh", dir.path().to_path_buf())
            .arg("-c")
            .arg("printf '%s' \"$SHOPDEV_PROBE\"; pwd >/dev/null")
            .env("SHOPDEV_PROBE", "here");
        assert_eq!(run_captured(&inv).unwrap(), "here");
    }
}
