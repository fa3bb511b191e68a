//! Shared helpers for synctest integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use synctest::{build_default_command_registry, HarnessConfig, TestRunner};
use tempfile::TempDir;

/// A scratch area holding test scripts and the runner's temp base.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create sandbox"),
        }
    }

    pub fn scripts(&self) -> PathBuf {
        self.dir.path().join("scripts")
    }

    pub fn temp_base(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    /// Writes a test script and returns its path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.scripts().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            tempdir: Some(self.temp_base()),
            log_stdout: false,
            ncpu: 2,
        }
    }

    pub fn runner(&self) -> TestRunner {
        TestRunner::new(self.config(), Arc::new(build_default_command_registry()))
    }
}

/// Path of a test's subtree under `runner`'s run root.
pub fn test_root(runner: &TestRunner, script: &Path) -> PathBuf {
    runner.run_root().join(script.file_name().unwrap())
}
