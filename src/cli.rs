//! The synctest command-line interface.
//!
//! This module is the main entry point of the `synctest` binary and wires the
//! library together: configuration, discovery, registry and runner.

use std::{path::Path, process, sync::Arc};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::HarnessConfig,
    discovery::TestDiscoverer,
    errors::{HarnessError, Result},
    registry::build_default_command_registry,
    runtime::TestRunner,
};

pub mod args;
mod output;

pub use args::SynctestArgs;

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = SynctestArgs::parse();
    init_tracing();

    match run_with(&args) {
        Ok(Outcome { files, workers }) => output::print_success(files, workers),
        Err(e) => {
            output::print_error(e);
            process::exit(1);
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub files: usize,
    pub workers: usize,
}

/// Runs the test files named by `args`.
pub fn run_with(args: &SynctestArgs) -> Result<Outcome> {
    let config = load_config(args.config.as_deref())?;
    let config = args.apply(config);

    let files = TestDiscoverer::discover(&args.paths)?;
    if files.is_empty() {
        return Err(HarnessError::NoTests {
            paths: args.paths.clone(),
        });
    }

    let registry = Arc::new(build_default_command_registry());
    let runner = TestRunner::new(config, registry);
    let parallel = !args.serial && files.len() > 1;
    info!(
        files = files.len(),
        parallel,
        run_root = %runner.run_root().display(),
        "starting run"
    );

    runner.run(&files, parallel)?;
    Ok(Outcome {
        files: files.len(),
        workers: if parallel { runner.workers() } else { 1 },
    })
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<HarnessConfig> {
    match path {
        Some(p) => HarnessConfig::from_yaml_file(p),
        None => Ok(HarnessConfig::default()),
    }
}

/// Installs the process-wide subscriber; per-test sinks override it while a test runs.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
