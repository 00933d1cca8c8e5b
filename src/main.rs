use clap::{Parser, Subcommand};

use commands::shortcut::ShortcutArgs;
use commands::GlobalArgs;
use shopdev::shortcut::{ShortcutName, TestVariant};

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Passthrough(ShortcutName),
}

mod commands;
mod output;
mod tty;

use commands::{config, doctor, reqs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "shopdev")]
#[command(version = VERSION)]
#[command(about = "Development shortcuts and requirements tooling for the shop project")]
struct Cli {
    /// Project root (default: nearest directory with shopdev.json or manage.py)
    #[arg(long, value_name = "DIR")]
    project: Option<String>,

    /// Config file (default: <project>/shopdev.json)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Print what would run instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Override the configured test shortcut variant
    #[arg(long, value_name = "VARIANT", value_parser = commands::parse_test_variant)]
    test_variant: Option<TestVariant>,

    /// Debug logging on stderr (SHOPDEV_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create new migrations (manage.py makemigrations)
    #[command(disable_help_flag = true)]
    Make(ShortcutArgs),
    /// Apply migrations (manage.py migrate)
    #[command(disable_help_flag = true)]
    Mig(ShortcutArgs),
    /// Start the development server (manage.py runserver)
    #[command(disable_help_flag = true)]
    Run(ShortcutArgs),
    /// Open the framework shell (manage.py shell)
    #[command(disable_help_flag = true)]
    Shell(ShortcutArgs),
    /// Run the test suite
    #[command(disable_help_flag = true)]
    Test(ShortcutArgs),
    /// Run the framework system checks (manage.py check)
    #[command(disable_help_flag = true)]
    Check(ShortcutArgs),
    /// Run pre-commit hooks on all files
    #[command(disable_help_flag = true)]
    Pre(ShortcutArgs),
    /// Freeze and split requirement lists
    Reqs(reqs::ReqsArgs),
    /// Check the project tree for missing pieces
    Doctor(doctor::DoctorArgs),
    /// List shortcuts and the commands they run
    Shortcuts,
    /// Manage shopdev.json
    Config(config::ConfigArgs),
}

impl Commands {
    fn shortcut(&self) -> Option<ShortcutName> {
        match self {
            Commands::Make(_) => Some(ShortcutName::Make),
            Commands::Mig(_) => Some(ShortcutName::Mig),
            Commands::Run(_) => Some(ShortcutName::Run),
            Commands::Shell(_) => Some(ShortcutName::Shell),
            Commands::Test(_) => Some(ShortcutName::Test),
            Commands::Check(_) => Some(ShortcutName::Check),
            Commands::Pre(_) => Some(ShortcutName::Pre),
            _ => None,
        }
    }

    fn into_shortcut_args(self) -> Option<ShortcutArgs> {
        match self {
            Commands::Make(args)
            | Commands::Mig(args)
            | Commands::Run(args)
            | Commands::Shell(args)
            | Commands::Test(args)
            | Commands::Check(args)
            | Commands::Pre(args) => Some(args),
            _ => None,
        }
    }
}

fn response_mode(command: &Commands, global: &GlobalArgs) -> ResponseMode {
    match command.shortcut() {
        Some(name) if !global.dry_run => ResponseMode::Passthrough(name),
        _ => ResponseMode::Json,
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    shopdev::logger::init_cli_logger(cli.verbose);

    let global = GlobalArgs {
        project: cli.project,
        config: cli.config,
        dry_run: cli.dry_run,
        test_variant: cli.test_variant,
    };

    let exit_code = match response_mode(&cli.command, &global) {
        ResponseMode::Passthrough(name) => {
            let Some(args) = cli.command.into_shortcut_args() else {
                return std::process::ExitCode::FAILURE;
            };

            match commands::shortcut::run_passthrough(name, args, &global) {
                Ok(code) => code,
                Err(err) => {
                    let code = output::exit_code_for_error(err.code);
                    let _ = output::print_result::<serde_json::Value>(Err(err));
                    code
                }
            }
        }
        ResponseMode::Json => {
            let (json_result, exit_code) = commands::run_json(cli.command, &global);
            let _ = output::print_json_result(json_result);
            exit_code
        }
    };

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn shortcut_args_are_forwarded_untouched() {
        let cli = parse(&["shopdev", "test", "-k", "checkout", "--create-db", "--help"]);
        assert_eq!(cli.command.shortcut(), Some(ShortcutName::Test));
        let args = cli.command.into_shortcut_args().unwrap();
        assert_eq!(args.args, vec!["-k", "checkout", "--create-db", "--help"]);
    }

    #[test]
    fn global_flags_go_before_the_shortcut() {
        let cli = parse(&["shopdev", "--dry-run", "--test-variant", "plain", "mig", "--fake"]);
        assert!(cli.dry_run);
        assert_eq!(cli.test_variant, Some(TestVariant::Plain));
        let args = cli.command.into_shortcut_args().unwrap();
        assert_eq!(args.args, vec!["--fake"]);
    }

    #[test]
    fn dry_run_switches_shortcuts_to_json() {
        let cli = parse(&["shopdev", "run", "0.0.0.0:8000"]);
        let global = GlobalArgs::default();
        assert!(matches!(
            response_mode(&cli.command, &global),
            ResponseMode::Passthrough(ShortcutName::Run)
        ));

        let dry = GlobalArgs {
            dry_run: true,
            ..GlobalArgs::default()
        };
        assert!(matches!(response_mode(&cli.command, &dry), ResponseMode::Json));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["shopdev", "--test-variant", "fast", "test"]).is_err());
    }

    #[test]
    fn exit_codes_are_clamped() {
        assert_eq!(exit_code_to_u8(-1), 0);
        assert_eq!(exit_code_to_u8(3), 3);
        assert_eq!(exit_code_to_u8(300), 255);
    }
}
