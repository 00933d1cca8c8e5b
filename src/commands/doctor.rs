use clap::{Args, ValueEnum};

use shopdev::doctor::{self, DoctorReport, FailOn};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct DoctorArgs {
    /// Lowest severity that makes the command exit non-zero
    #[arg(long, value_enum, default_value_t = FailOnArg::Error)]
    fail_on: FailOnArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FailOnArg {
    Error,
    Warning,
}

impl From<FailOnArg> for FailOn {
    fn from(arg: FailOnArg) -> Self {
        match arg {
            FailOnArg::Error => FailOn::Error,
            FailOnArg::Warning => FailOn::Warning,
        }
    }
}

pub fn run(args: DoctorArgs, global: &GlobalArgs) -> CmdResult<DoctorReport> {
    let project = global.project()?;
    let report = doctor::scan(&project);
    let exit_code = report.exit_code(args.fail_on.into());

    shopdev::log_status!(
        "doctor",
        "{} checks passed, {} issues",
        report.summary.checks_passed,
        report.issues.len()
    );

    Ok((report, exit_code))
}
