//! Placeholder expansion for command arguments.
//!
//! Shell rules: `${NAME}` and `$NAME` are replaced with the value of the
//! matching variable, and so is a single special character after `$` (a digit
//! or one of `*#$@!?-`, as in `$1`). Names the environment does not define
//! become the empty string. Malformed braces (`${}` or an unclosed `${`) are
//! dropped. A `$` followed by anything else is left untouched.

use super::env::TestEnv;
use crate::errors::{HarnessError, Result};
use crate::syntax::ParsedCommand;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([^}]*)\}|\{|([*#$@!?0-9-])|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("placeholder pattern is valid")
});

/// Expands every placeholder in `arg` using `lookup`.
pub fn expand_with<F>(arg: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_RE
        .replace_all(arg, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if name.is_empty() {
                return String::new();
            }
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}

/// Expands the arguments of `cmd` (everything after the verb) against `env`.
///
/// An argument that expands to nothing is an error: an empty path must never
/// reach a filesystem call.
pub fn expand_args(env: &TestEnv, cmd: &ParsedCommand) -> Result<Vec<String>> {
    cmd.params()
        .iter()
        .map(|arg| {
            let expanded = expand_with(arg, |name| env.var(name));
            if expanded.is_empty() {
                return Err(HarnessError::Expansion {
                    test: env.name.clone(),
                    verb: cmd.command.name().to_string(),
                    arg: arg.clone(),
                });
            }
            Ok(expanded)
        })
        .collect()
}
