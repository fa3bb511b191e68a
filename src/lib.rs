//! synctest: builds lhs/rhs fixture trees from line-oriented test scripts,
//! for exercising sync and backup tools.

pub use crate::commands::Command;
pub use crate::config::HarnessConfig;
pub use crate::errors::{BatchError, CommandError, HarnessError};
pub use crate::registry::{build_default_command_registry, CommandRegistry};
pub use crate::runtime::{Side, TestEnv, TestRunner};
pub use crate::syntax::ParsedCommand;

pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod fixtures;
pub mod registry;
pub mod runtime;
pub mod syntax;
