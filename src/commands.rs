//! # Fixture Commands
//!
//! Every DSL verb is a [`Command`]: a named handler that receives the test
//! environment and its already expanded arguments.
//!
//! ## Module Structure
//!
//! - **`mkfile`**: random files or directories (`mkfile`)
//! - **`rm`**: entry removal (`rm`)
//! - **`symlink`**: symbolic links (`symlink`)
//! - **`retime`**: timestamp synchronisation (`sync`, `touch`)
//! - **`mutate`**: in-place random corruption (`mutate`)
//! - **`clone`**: lhs to rhs copies (`clone`)
//!
//! New verbs are added by implementing [`Command`] and registering the
//! handler; the parser and runner never name concrete commands.

use crate::errors::CommandError;
use crate::registry::CommandRegistry;
use crate::runtime::env::{Side, TestEnv};

pub mod clone;
pub mod mkfile;
pub mod mutate;
pub mod retime;
pub mod rm;
pub mod symlink;

// ============================================================================
// CORE TRAIT
// ============================================================================

/// A test-harness command.
pub trait Command: Send + Sync {
    /// The DSL verb; unique within a registry.
    fn name(&self) -> &str;

    /// Runs the command; `args` excludes the verb and has placeholders expanded.
    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError>;
}

/// Registers every built-in command with `registry`.
pub fn register_all_commands(registry: &CommandRegistry) {
    registry.register(mkfile::MkfileCmd);
    registry.register(rm::RmCmd);
    registry.register(symlink::SymlinkCmd);
    registry.register(retime::SyncCmd);
    registry.register(retime::TouchCmd);
    registry.register(mutate::MutateCmd);
    registry.register(clone::CloneCmd);
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

/// Splits a `lhs="a b c"` style argument into its side and names.
pub fn split_side_arg(arg: &str) -> Result<(Side, Vec<String>), CommandError> {
    let (key, vals) = arg
        .split_once('=')
        .ok_or_else(|| CommandError::invalid(format!("{}: expected lhs=... or rhs=...", arg)))?;

    let side: Side = key.parse()?;
    let vals: Vec<String> = vals.split_whitespace().map(str::to_string).collect();
    if vals.is_empty() {
        return Err(CommandError::invalid(format!("{} is empty?", side)));
    }
    Ok((side, vals))
}

/// Parses a byte size such as `4096`, `1k`, `8K`, `2MB` or `1GiB` (binary multiples).
pub fn parse_size(s: &str) -> Result<u64, String> {
    let t = s.trim();
    let split = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
    let (num, suffix) = t.split_at(split);
    if num.is_empty() {
        return Err(format!("invalid size '{}'", s));
    }

    let n: u64 = num.parse().map_err(|_| format!("invalid size '{}'", s))?;
    let shift = match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        "t" | "tb" | "tib" => 40,
        _ => return Err(format!("invalid size suffix '{}' in '{}'", suffix, s)),
    };
    n.checked_mul(1u64 << shift)
        .ok_or_else(|| format!("size '{}' is too large", s))
}
