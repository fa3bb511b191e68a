//! The per-test environment.
//!
//! Layout under the run root:
//!
//! ```text
//! <run root>/<test file name>/
//!     lhs/
//!     rhs/
//!     test.log
//! ```

use super::log::LogSink;
use crate::config::HarnessConfig;
use crate::errors::{CommandError, HarnessError, Result};
use std::fmt;
use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

// ============================================================================
// SIDES
// ============================================================================

/// One of the two trees being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Lhs,
    Rhs,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Lhs, Side::Rhs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Lhs => "lhs",
            Side::Rhs => "rhs",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = CommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "lhs" => Ok(Side::Lhs),
            "rhs" => Ok(Side::Rhs),
            _ => Err(CommandError::invalid(format!("unknown keyword {}", s))),
        }
    }
}

// ============================================================================
// TEST ENVIRONMENT
// ============================================================================

/// Runtime context of one test file. Owned by exactly one execution.
#[derive(Debug)]
pub struct TestEnv {
    pub lhs: PathBuf,
    pub rhs: PathBuf,
    /// This test's temp root: `<run root>/<name>`.
    pub root: PathBuf,
    pub name: String,
    /// The single "now" shared by every time-sensitive fixture operation in this test.
    pub start: SystemTime,
    /// Worker budget of the runner, for commands that want to fan out.
    pub ncpu: usize,
    log: LogSink,
}

impl TestEnv {
    /// Creates `<run_root>/<name>/{lhs,rhs}` (mode 0700) and opens the log sink.
    ///
    /// The test root itself must not exist yet: two tests never share a subtree.
    pub fn build(run_root: &Path, name: &str, config: &HarnessConfig) -> Result<Self> {
        let env_err = |what: &'static str| {
            let test = name.to_string();
            move |source| HarnessError::Environment { test, what, source }
        };

        let root = run_root.join(name);
        let lhs = root.join(Side::Lhs.as_str());
        let rhs = root.join(Side::Rhs.as_str());

        DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(run_root)
            .map_err(env_err("run root"))?;
        DirBuilder::new()
            .mode(0o700)
            .create(&root)
            .map_err(env_err("test root"))?;
        DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(&lhs)
            .map_err(env_err("LHS"))?;
        DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(&rhs)
            .map_err(env_err("RHS"))?;

        let log = LogSink::open(config.log_target(), &root).map_err(env_err("logfile"))?;

        Ok(Self {
            lhs,
            rhs,
            root,
            name: name.to_string(),
            start: SystemTime::now(),
            ncpu: config.workers(),
            log,
        })
    }

    pub fn side(&self, side: Side) -> &Path {
        match side {
            Side::Lhs => &self.lhs,
            Side::Rhs => &self.rhs,
        }
    }

    /// Resolves a fixture name: absolute paths are kept, relative ones land under `side`.
    pub fn resolve(&self, side: Side, name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.side(side).join(p)
        }
    }

    /// Value of a placeholder variable, `None` for names the harness doesn't define.
    pub fn var(&self, name: &str) -> Option<String> {
        match name {
            "LHS" => Some(self.lhs.display().to_string()),
            "RHS" => Some(self.rhs.display().to_string()),
            "ROOT" => Some(self.root.display().to_string()),
            "TNAME" => Some(self.name.clone()),
            _ => None,
        }
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    /// Closes the log sink; the directories are left alone.
    pub fn close(self) {
        self.log.close();
    }
}

impl fmt::Display for TestEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TestEnv: name {}: Root: {}",
            self.name,
            self.root.display()
        )?;
        writeln!(
            f,
            "\tLHS {}, RHS {}",
            self.lhs.display(),
            self.rhs.display()
        )
    }
}
