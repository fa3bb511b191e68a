//! Runtime of the harness: everything between a parsed test file and its outcome.
//!
//! - [`env`]: the isolated per-test environment (lhs/rhs trees, start time, log sink)
//! - [`log`]: the per-test `tracing` sink
//! - [`expand`]: `$VAR` substitution in command arguments
//! - [`runner`]: single-file execution and sequential/parallel batches

pub mod env;
pub mod expand;
pub mod log;
pub mod runner;

pub use env::{Side, TestEnv};
pub use runner::TestRunner;
