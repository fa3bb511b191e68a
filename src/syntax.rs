//! Syntax of synctest test files.
//!
//! A test file is line oriented:
//!
//! ```text
//! # comments start with '#'
//! mkfile -t both a/b/c.txt \
//!        d/e.txt
//! symlink lhs="link@a/b/c.txt"
//! sync
//! ```
//!
//! Each logical line is split into words with shell quoting rules; the first
//! word is the verb and must name a registered command.

use crate::commands::Command;
use std::fmt;
use std::sync::Arc;

pub mod lexer;
pub mod parser;

pub use parser::{parse_source, parse_test_file};

/// One logical line of a test file, resolved against the command registry.
#[derive(Clone)]
pub struct ParsedCommand {
    pub command: Arc<dyn Command>,
    /// Raw words of the line; `args[0]` is the verb.
    pub args: Vec<String>,
    /// Line number the command ends on.
    pub line: usize,
}

impl ParsedCommand {
    pub fn verb(&self) -> &str {
        &self.args[0]
    }

    /// Arguments after the verb, before variable expansion.
    pub fn params(&self) -> &[String] {
        &self.args[1..]
    }
}

impl PartialEq for ParsedCommand {
    fn eq(&self, other: &Self) -> bool {
        self.command.name() == other.command.name()
            && self.args == other.args
            && self.line == other.line
    }
}

impl fmt::Debug for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedCommand")
            .field("command", &self.command.name())
            .field("args", &self.args)
            .field("line", &self.line)
            .finish()
    }
}
