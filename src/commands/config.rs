use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::fs;

use shopdev::defaults::{self, Defaults, ShopdevConfig};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore shopdev.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Set a configuration value at a JSON pointer path
    Set {
        /// JSON pointer path (e.g., /defaults/test/variant)
        pointer: String,
        /// Value to set (JSON; bare words are taken as strings)
        value: String,
    },
    /// Write shopdev.json with the built-in defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Reset configuration to built-in defaults (deletes shopdev.json)
    Reset,
    /// Show the path to shopdev.json
    Path,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ShopdevConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

impl ConfigOutput {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            config: None,
            defaults: None,
            path: None,
            exists: None,
            pointer: None,
            value: None,
            deleted: None,
        }
    }
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin, global),
        ConfigCommand::Set { pointer, value } => set(&pointer, &value, global),
        ConfigCommand::Init { force } => init(force, global),
        ConfigCommand::Reset => reset(global),
        ConfigCommand::Path => path(global),
    }
}

fn show(builtin: bool, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.show");

    if builtin {
        output.defaults = Some(defaults::builtin_defaults());
    } else {
        let project = global.project()?;
        output.path = Some(project.config_path.display().to_string());
        output.exists = Some(project.config_path.is_file());
        output.config = Some(project.config);
    }

    Ok((output, 0))
}

fn set(pointer: &str, raw: &str, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let project = global.project()?;

    // Bare words like `plain` are not valid JSON; treat them as strings
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let config = defaults::set_pointer(&project.config, pointer, value.clone())?;
    defaults::save_config(&project.config_path, &config)?;

    let mut output = ConfigOutput::new("config.set");
    output.path = Some(project.config_path.display().to_string());
    output.pointer = Some(pointer.to_string());
    output.value = Some(value);
    output.config = Some(config);
    Ok((output, 0))
}

fn init(force: bool, global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let (_root, config_path) = global.project_paths()?;

    if config_path.is_file() && !force {
        return Err(shopdev::Error::validation_invalid_argument(
            "config",
            format!("{} already exists", config_path.display()),
            None,
            None,
        )
        .with_hint("Pass --force to overwrite it with the built-in defaults"));
    }

    let config = ShopdevConfig::default();
    defaults::save_config(&config_path, &config)?;

    let mut output = ConfigOutput::new("config.init");
    output.path = Some(config_path.display().to_string());
    output.exists = Some(true);
    output.config = Some(config);
    Ok((output, 0))
}

fn reset(global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let (_root, config_path) = global.project_paths()?;
    let deleted = if config_path.is_file() {
        fs::remove_file(&config_path).map_err(|e| {
            shopdev::Error::internal_io(
                e.to_string(),
                Some(format!("delete {}", config_path.display())),
            )
        })?;
        true
    } else {
        false
    };

    let mut output = ConfigOutput::new("config.reset");
    output.defaults = Some(defaults::builtin_defaults());
    output.path = Some(config_path.display().to_string());
    output.deleted = Some(deleted);
    Ok((output, 0))
}

fn path(global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let (_root, config_path) = global.project_paths()?;

    let mut output = ConfigOutput::new("config.path");
    output.exists = Some(config_path.is_file());
    output.path = Some(config_path.display().to_string());
    Ok((output, 0))
}
