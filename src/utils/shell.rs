//! POSIX shell quoting for displaying command lines.

/// Characters that never need quoting.
fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ',' | ':' | '=' | '+' | '@' | '%')
}

/// Quote a single argument so the shell reads it back verbatim.
/// - Empty strings become `''`
/// - Anything outside the plain set is wrapped in single quotes
/// - Embedded single quotes become `'\''`
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    if arg.chars().all(is_plain) {
        return arg.to_string();
    }

    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Quote and join multiple arguments with spaces.
pub fn quote_args(args: &[String]) -> String {
    args.iter()
        .map(|a| quote_arg(a))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_args_stay_bare() {
        assert_eq!(quote_arg("manage.py"), "manage.py");
        assert_eq!(quote_arg("--ds=config.settings.test"), "--ds=config.settings.test");
    }

    #[test]
    fn args_with_spaces_or_globs_are_quoted() {
        assert_eq!(quote_arg("test orders"), "'test orders'");
        assert_eq!(quote_arg("tests/*"), "'tests/*'");
        assert_eq!(quote_arg("$HOME"), "'$HOME'");
    }

    #[test]
    fn single_quotes_are_escaped() {
        assert_eq!(quote_arg("it's"), "'it'\\''s'");
    }

    #[test]
    fn empty_arg_is_explicit() {
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn quote_args_joins_with_spaces() {
        let args = vec!["pytest".to_string(), "-k".to_string(), "a or b".to_string()];
        assert_eq!(quote_args(&args), "pytest -k 'a or b'");
    }
}
