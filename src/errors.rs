//! Synctest error handling.
//!
//! Two layers:
//! - [`CommandError`]: what a single fixture command reports back to the dispatcher.
//! - [`HarnessError`]: everything the harness itself reports, always carrying
//!   the test file, line, or verb that produced it.
//!
//! [`BatchError`] aggregates the failures of a parallel batch without
//! summarising any of them away.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Shared source text of a test file, used to render parse diagnostics.
pub type SourceFile = Arc<NamedSource<String>>;

// ============================================================================
// COMMAND ERRORS
// ============================================================================

/// Errors raised by implementations of [`crate::commands::Command`].
#[derive(Error, Diagnostic, Debug)]
pub enum CommandError {
    #[error("{op} {}: {source}", path.display())]
    #[diagnostic(code(synctest::command::io))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: already exists", path.display())]
    #[diagnostic(code(synctest::command::exists))]
    AlreadyExists { path: PathBuf },

    #[error("{}: doesn't exist", path.display())]
    #[diagnostic(code(synctest::command::missing))]
    NotFound { path: PathBuf },

    #[error("{0}")]
    #[diagnostic(code(synctest::command::usage))]
    Usage(String),

    #[error("{0}")]
    #[diagnostic(code(synctest::command::invalid_argument))]
    InvalidArgument(String),

    #[error("walk {}: {source}", root.display())]
    #[diagnostic(code(synctest::command::walk))]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl CommandError {
    pub fn io(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<clap::Error> for CommandError {
    fn from(e: clap::Error) -> Self {
        // clap renders a multi-line usage block; keep it intact for the log
        Self::Usage(e.render().to_string().trim_end().to_string())
    }
}

// ============================================================================
// HARNESS ERRORS
// ============================================================================

/// Every failure the harness can report for a single test file.
#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    #[error("{}: {source}", file.display())]
    #[diagnostic(code(synctest::io::read))]
    Read {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file}:{line}: {message}")]
    #[diagnostic(code(synctest::parse::tokenize))]
    Tokenize {
        file: String,
        line: usize,
        message: String,
        #[source_code]
        src: SourceFile,
        #[label("can't split this line into words")]
        span: SourceSpan,
    },

    #[error("{file}:{line}: unknown command {verb}")]
    #[diagnostic(
        code(synctest::parse::unknown_command),
        help("verbs must be registered with the command registry before parsing")
    )]
    UnknownCommand {
        file: String,
        line: usize,
        verb: String,
        #[source_code]
        src: SourceFile,
        #[label("not a registered command")]
        span: SourceSpan,
    },

    #[error("{file}:{line}: {message}")]
    #[diagnostic(code(synctest::parse::malformed))]
    Malformed {
        file: String,
        line: usize,
        message: String,
        #[source_code]
        src: SourceFile,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("{test}: {verb}: can't expand env {arg}")]
    #[diagnostic(
        code(synctest::expand),
        help("recognised variables are $LHS, $RHS, $ROOT and $TNAME")
    )]
    Expansion {
        test: String,
        verb: String,
        arg: String,
    },

    #[error("{test}: {what}: {source}")]
    #[diagnostic(code(synctest::env))]
    Environment {
        test: String,
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{test}: {verb}: {source}")]
    #[diagnostic(code(synctest::command))]
    Command {
        test: String,
        verb: String,
        #[source]
        #[diagnostic_source]
        source: CommandError,
    },

    #[error("{test}: cleanup {}: {source}", path.display())]
    #[diagnostic(code(synctest::cleanup))]
    Cleanup {
        test: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cleanup {}: {source}", path.display())]
    #[diagnostic(code(synctest::cleanup::run_root))]
    RunRootCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("discover {}: {source}", root.display())]
    #[diagnostic(code(synctest::discover))]
    Discover {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("config {}: {message}", path.display())]
    #[diagnostic(code(synctest::config))]
    Config { path: PathBuf, message: String },

    #[error("no test files found in {}", display_paths(paths))]
    #[diagnostic(code(synctest::discover::empty), help("test files end in .t"))]
    NoTests { paths: Vec<PathBuf> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Batch(#[from] BatchError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl HarnessError {
    /// Test name for errors that are scoped to a single test file.
    pub fn test_name(&self) -> Option<&str> {
        match self {
            Self::Expansion { test, .. }
            | Self::Environment { test, .. }
            | Self::Command { test, .. }
            | Self::Cleanup { test, .. } => Some(test),
            Self::Tokenize { file, .. }
            | Self::UnknownCommand { file, .. }
            | Self::Malformed { file, .. } => Some(file),
            _ => None,
        }
    }

    /// True for the file+line located errors produced by the parser.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Tokenize { .. } | Self::UnknownCommand { .. } | Self::Malformed { .. }
        )
    }
}

// ============================================================================
// AGGREGATE
// ============================================================================

/// The union of every failure raised by a parallel batch.
#[derive(Error, Diagnostic, Debug)]
#[diagnostic(code(synctest::batch))]
pub struct BatchError {
    #[related]
    pub errors: Vec<HarnessError>,
}

impl BatchError {
    pub fn new(errors: Vec<HarnessError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HarnessError> {
        self.errors.iter()
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} test(s) failed", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n{}", e)?;
        }
        Ok(())
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
