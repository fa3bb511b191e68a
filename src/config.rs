//! Harness configuration.
//!
//! ```yaml
//! tempdir: /var/tmp       # base for the per-run temp root; default: system temp dir
//! log_stdout: false       # per-test logs go to stdout instead of <test>/test.log
//! ncpu: 4                 # worker threads; 0 = half the available cpus
//! ```

use crate::errors::{HarnessError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where each test's log sink writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `<test root>/test.log`
    File,
    /// Shared standard output stream.
    Stdout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub tempdir: Option<PathBuf>,
    pub log_stdout: bool,
    pub ncpu: usize,
}

impl HarnessConfig {
    pub fn from_yaml_str(path: &Path, text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| HarnessError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| HarnessError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(path, &text)
    }

    /// Base directory for the run root.
    pub fn temp_base(&self) -> PathBuf {
        match &self.tempdir {
            Some(d) if !d.as_os_str().is_empty() => d.clone(),
            _ => std::env::temp_dir(),
        }
    }

    pub fn log_target(&self) -> LogTarget {
        if self.log_stdout {
            LogTarget::Stdout
        } else {
            LogTarget::File
        }
    }

    /// Worker pool size: the configured value, or half the available cpus, never less than 1.
    pub fn workers(&self) -> usize {
        if self.ncpu > 0 {
            return self.ncpu;
        }
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cpus / 2).max(1)
    }
}
