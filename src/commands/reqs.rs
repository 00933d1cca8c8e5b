use clap::{Args, Subcommand};
use serde::Serialize;

use shopdev::requirements::{self, FreezeResult, SplitResult};
use shopdev::shortcut::Invocation;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ReqsArgs {
    #[command(subcommand)]
    command: ReqsCommand,
}

#[derive(Subcommand)]
enum ReqsCommand {
    /// Freeze installed packages into requirements/full.txt
    Freeze,
    /// Split requirements/full.txt into base.txt and dev.txt
    Split,
    /// Freeze, then split
    Update,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReqsOutput {
    command: String,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    freeze: Option<FreezeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    split: Option<SplitResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    planned: Option<Invocation>,
}

pub fn run(args: ReqsArgs, global: &GlobalArgs) -> CmdResult<ReqsOutput> {
    let project = global.project()?;

    let (name, do_freeze, do_split) = match args.command {
        ReqsCommand::Freeze => ("reqs.freeze", true, false),
        ReqsCommand::Split => ("reqs.split", false, true),
        ReqsCommand::Update => ("reqs.update", true, true),
    };

    let mut output = ReqsOutput {
        command: name.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        freeze: None,
        split: None,
        planned: None,
    };

    if global.dry_run {
        if do_freeze {
            output.planned = Some(requirements::freeze_invocation(&project));
        }
        return Ok((output, 0));
    }

    if do_freeze {
        output.freeze = Some(requirements::freeze(&project)?);
    }
    if do_split {
        output.split = Some(requirements::split_project(&project)?);
    }

    Ok((output, 0))
}
