//! Partition of frozen requirement lines into base and dev lists.

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// First line of every dev list.
pub const DEV_HEADER: &str = "-r base.txt";

/// Matches lines starting with one of the base package names (case-sensitive).
#[derive(Debug, Clone)]
pub struct BaseMatcher {
    pattern: Option<Regex>,
}

impl BaseMatcher {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Ok(Self { pattern: None });
        }

        if names.iter().any(|name| name.as_ref().is_empty()) {
            return Err(Error::config_invalid_value(
                "requirements.base_packages",
                Some(String::new()),
                "an empty package name would match every line",
            ));
        }

        let alternatives = names
            .iter()
            .map(|name| regex::escape(name.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!("^(?:{})", alternatives)).map_err(|e| {
            Error::config_invalid_value("requirements.base_packages", None, e.to_string())
        })?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_base(&self, line: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(line))
    }
}

/// Every input line lands in exactly one of the two lists, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementsSplit {
    pub base: Vec<String>,
    pub dev: Vec<String>,
}

impl RequirementsSplit {
    /// Contents of `base.txt`.
    pub fn base_text(&self) -> String {
        render(&self.base)
    }

    /// Contents of `dev.txt`, header first.
    pub fn dev_text(&self) -> String {
        format!("{}\n{}", DEV_HEADER, render(&self.dev))
    }
}

pub fn split(frozen: &str, matcher: &BaseMatcher) -> RequirementsSplit {
    let (base, dev): (Vec<&str>, Vec<&str>) = frozen.lines().partition(|line| matcher.is_base(line));

    RequirementsSplit {
        base: base.into_iter().map(str::to_string).collect(),
        dev: dev.into_iter().map(str::to_string).collect(),
    }
}

fn render(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{}\n", line)).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use proptest::prelude::*;

    fn base_names() -> Vec<String> {
        builtin_defaults().requirements.base_packages
    }

    fn starts_with_base(line: &str) -> bool {
        base_names().iter().any(|name| line.starts_with(name.as_str()))
    }

    fn requirement_line() -> impl Strategy<Value = String> {
        let name = prop::sample::select(base_names());
        prop_oneof![
            (name.clone(), "(==|>=|~=)[0-9]{1,2}\\.[0-9]{1,2}").prop_map(|(n, v)| format!("{n}{v}")),
            name.clone().prop_map(|n| format!("{}==1.0", n.to_lowercase())),
            name.clone().prop_map(|n| format!(" {n}==1.0")),
            name.prop_map(|n| format!("{n}-extra==2.0")),
            Just(String::new()),
            "# [a-z ]{0,12}",
            "[a-zA-Z0-9_.-]{1,16}==[0-9]\\.[0-9]",
        ]
    }

    fn frozen_text() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(requirement_line(), 0..24),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(lines, crlf, trailing)| {
                let sep = if crlf { "\r\n" } else { "\n" };
                let mut text = lines.join(sep);
                if trailing && !lines.is_empty() {
                    text.push_str(sep);
                }
                text
            })
    }

    proptest! {
        #[test]
        fn every_line_lands_in_exactly_one_list(frozen in frozen_text()) {
            let matcher = BaseMatcher::new(&base_names()).unwrap();
            let result = split(&frozen, &matcher);

            let mut base = result.base.iter();
            let mut dev = result.dev.iter();
            for line in frozen.lines() {
                let target = if starts_with_base(line) { &mut base } else { &mut dev };
                prop_assert_eq!(target.next().map(String::as_str), Some(line));
            }
            prop_assert!(base.next().is_none());
            prop_assert!(dev.next().is_none());
        }

        #[test]
        fn dev_list_always_starts_with_header(frozen in frozen_text()) {
            let matcher = BaseMatcher::new(&base_names()).unwrap();
            let dev = split(&frozen, &matcher).dev_text();
            prop_assert_eq!(dev.lines().next(), Some(DEV_HEADER));
        }

        #[test]
        fn splitting_again_changes_nothing(frozen in frozen_text()) {
            let matcher = BaseMatcher::new(&base_names()).unwrap();
            let first = split(&frozen, &matcher);
            let second = split(&frozen, &matcher);
            prop_assert_eq!(first.base_text(), second.base_text());
            prop_assert_eq!(first.dev_text(), second.dev_text());

            let rebased = split(&first.base_text(), &matcher);
            prop_assert_eq!(rebased.base_text(), first.base_text());
            prop_assert!(rebased.dev.is_empty());
        }
    }
}
