use serde::Serialize;

use shopdev::shortcut::{self, ShortcutName, TestVariant};

use super::{CmdResult, GlobalArgs};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutEntry {
    name: ShortcutName,
    description: String,
    command: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutsOutput {
    command: String,
    test_variant: TestVariant,
    shortcuts: Vec<ShortcutEntry>,
}

pub fn run(_args: (), global: &GlobalArgs) -> CmdResult<ShortcutsOutput> {
    let project = global.project()?;
    let defaults = project.defaults();

    let shortcuts = ShortcutName::ALL
        .iter()
        .map(|name| ShortcutEntry {
            name: *name,
            description: name.description().to_string(),
            command: shortcut::template(*name, defaults, global.test_variant),
        })
        .collect();

    Ok((
        ShortcutsOutput {
            command: "shortcuts.list".to_string(),
            test_variant: global.test_variant.unwrap_or(defaults.test.variant),
            shortcuts,
        },
        0,
    ))
}
