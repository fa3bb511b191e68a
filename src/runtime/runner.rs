//! Test execution.
//!
//! One test file goes through `parse -> build env -> run commands -> cleanup`:
//!
//! - a parse failure ends the test before any directory is created;
//! - commands run strictly in file order and the first failure stops the file;
//! - a passing test removes its temp subtree, a failing one keeps it for inspection.
//!
//! Batches run either sequentially (stop at the first failing file) or on a
//! fixed pool of worker threads, where every file runs to completion and all
//! failures are returned together as a [`BatchError`].

use super::env::TestEnv;
use super::expand::expand_args;
use crate::config::HarnessConfig;
use crate::errors::{BatchError, HarnessError, Result};
use crate::fixtures::{rand_hex, remove_tree};
use crate::registry::CommandRegistry;
use crate::syntax::{parse_test_file, ParsedCommand};
use crossbeam::channel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, info_span};

/// Runs test files against a shared command registry.
///
/// Every runner owns a fresh run root, `<tempdir>/testrunner-<hex>`; each test
/// gets `<run root>/<test file name>` below it.
#[derive(Debug)]
pub struct TestRunner {
    config: HarnessConfig,
    registry: Arc<CommandRegistry>,
    run_root: PathBuf,
    ncpu: usize,
}

impl TestRunner {
    pub fn new(config: HarnessConfig, registry: Arc<CommandRegistry>) -> Self {
        let run_root = config
            .temp_base()
            .join(format!("testrunner-{}", rand_hex(4)));
        let ncpu = config.workers();
        Self {
            config,
            registry,
            run_root,
            ncpu,
        }
    }

    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    pub fn workers(&self) -> usize {
        self.ncpu
    }

    /// Runs every file in `paths`; removes the run root if they all pass.
    pub fn run(&self, paths: &[PathBuf], parallel: bool) -> Result<()> {
        if parallel {
            self.parallelize(paths)?;
        } else {
            self.serialize(paths)?;
        }
        self.remove_run_root()
    }

    /// Runs a single file; removes the run root if it passes.
    pub fn run_one(&self, path: &Path) -> Result<()> {
        self.run_test(path)?;
        self.remove_run_root()
    }

    /// Runs a single test file end to end.
    pub fn run_test(&self, path: &Path) -> Result<()> {
        let cmds = parse_test_file(path, &self.registry)?;

        let name = test_name(path);
        let env = TestEnv::build(&self.run_root, &name, &self.config)?;

        let result = env.log().in_scope(|| {
            let span = info_span!("test", name = %env.name);
            let _enter = span.enter();

            let result = execute(&env, &cmds);
            match &result {
                Ok(()) => info!("tests passed; removing {} ..", env.root.display()),
                Err(e) => info!("test {} complete: error:\n{}", env.name, e),
            }
            result
        });

        let root = env.root.clone();
        env.close();
        result?;

        remove_tree(&root).map_err(|source| HarnessError::Cleanup {
            test: name,
            path: root,
            source,
        })
    }

    fn serialize(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            self.run_test(path)?;
        }
        Ok(())
    }

    fn parallelize(&self, paths: &[PathBuf]) -> Result<()> {
        let workers = self.ncpu.min(paths.len()).max(1);
        info!(
            files = paths.len(),
            workers,
            run_root = %self.run_root.display(),
            "running tests in parallel"
        );

        let (work_tx, work_rx) = channel::bounded::<(usize, &Path)>(workers);
        let (err_tx, err_rx) = channel::unbounded::<(usize, HarnessError)>();

        thread::scope(|s| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let err_tx = err_tx.clone();
                s.spawn(move || {
                    for (idx, path) in work_rx.iter() {
                        if let Err(e) = self.run_test(path) {
                            debug!(test = %path.display(), "test failed");
                            // the receiver outlives every worker
                            let _ = err_tx.send((idx, e));
                        }
                    }
                });
            }
            drop(err_tx);

            for (idx, path) in paths.iter().enumerate() {
                if work_tx.send((idx, path.as_path())).is_err() {
                    break;
                }
            }
            drop(work_tx);
        });

        let mut errors: Vec<(usize, HarnessError)> = err_rx.iter().collect();
        if errors.is_empty() {
            return Ok(());
        }
        errors.sort_by_key(|(idx, _)| *idx);
        Err(BatchError::new(errors.into_iter().map(|(_, e)| e).collect()).into())
    }

    fn remove_run_root(&self) -> Result<()> {
        remove_tree(&self.run_root).map_err(|source| HarnessError::RunRootCleanup {
            path: self.run_root.clone(),
            source,
        })
    }
}

/// Dispatches each parsed command in order, stopping at the first failure.
fn execute(env: &TestEnv, cmds: &[ParsedCommand]) -> Result<()> {
    info!(
        "testroot {}; starting test {} ..",
        env.root.display(),
        env.name
    );
    for cmd in cmds {
        let args = expand_args(env, cmd)?;
        debug!(line = cmd.line, "{} {:?}", cmd.verb(), args);
        cmd.command
            .run(env, &args)
            .map_err(|source| HarnessError::Command {
                test: env.name.clone(),
                verb: cmd.command.name().to_string(),
                source,
            })?;
    }
    Ok(())
}

/// A test is named after its file's base name.
fn test_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_base_name() {
        assert_eq!(test_name(Path::new("a/b/basic.t")), "basic.t");
        assert_eq!(test_name(Path::new("solo.t")), "solo.t");
    }

    #[test]
    fn test_run_root_is_unique_per_runner() {
        let registry = Arc::new(CommandRegistry::new());
        let a = TestRunner::new(HarnessConfig::default(), registry.clone());
        let b = TestRunner::new(HarnessConfig::default(), registry);
        assert_ne!(a.run_root(), b.run_root());
        let name = a.run_root().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("testrunner-"));
        assert_eq!(name.len(), "testrunner-".len() + 8);
    }
}
