//! Helpers for inspecting finished child processes.

use std::process::Output;

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn output(stdout: &str, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(256),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn error_text_prefers_stderr() {
        assert_eq!(error_text(&output("pip output", "ERROR: no pip\n")), "ERROR: no pip");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        assert_eq!(error_text(&output("  only stdout\n", "   ")), "only stdout");
    }
}
