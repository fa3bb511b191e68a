//! Defines the command-line arguments for the synctest CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::Parser;
use std::path::PathBuf;

use crate::config::HarnessConfig;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "synctest",
    version,
    about = "Builds lhs/rhs fixture trees from test scripts for sync and backup tools."
)]
pub struct SynctestArgs {
    /// YAML configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base directory for the run's temp root.
    #[arg(short = 'T', long = "tempdir")]
    pub tempdir: Option<PathBuf>,

    /// Write per-test logs to stdout instead of <test>/test.log.
    #[arg(long = "log-stdout")]
    pub log_stdout: bool,

    /// Number of worker threads (0 = half the available cpus).
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<usize>,

    /// Run test files one at a time and stop at the first failure.
    #[arg(short = 's', long = "serial")]
    pub serial: bool,

    /// Test files or directories containing `*.t` files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl SynctestArgs {
    /// Applies command-line overrides on top of `config`.
    pub fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(dir) = &self.tempdir {
            config.tempdir = Some(dir.clone());
        }
        if self.log_stdout {
            config.log_stdout = true;
        }
        if let Some(n) = self.jobs {
            config.ncpu = n;
        }
        config
    }
}
