//! `mutate [-m MINPCT] [-M MAXPCT] lhs="a b" rhs="c"`
//!
//! Overwrites a random share (default 10% to 20%) of each named file's bytes
//! and sometimes grows the file. See [`crate::fixtures::mutate`].

use super::{split_side_arg, Command};
use crate::errors::CommandError;
use crate::fixtures::{mutate, MAX_MUTATE_PCT};
use crate::runtime::env::TestEnv;
use clap::Parser;
use tracing::debug;

fn pct_parser() -> clap::builder::RangedU64ValueParser<u64> {
    clap::value_parser!(u64).range(0..=MAX_MUTATE_PCT)
}

#[derive(Debug, Parser)]
#[command(
    name = "mutate",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct MutateArgs {
    /// Minimum percentage of bytes to change
    #[arg(short = 'm', long = "min-pct", default_value_t = 10, value_parser = pct_parser())]
    min_pct: u64,

    /// Maximum percentage of bytes to change
    #[arg(short = 'M', long = "max-pct", default_value_t = 20, value_parser = pct_parser())]
    max_pct: u64,

    /// `lhs=...` / `rhs=...` file lists
    #[arg(required = true)]
    files: Vec<String>,
}

pub struct MutateCmd;

impl Command for MutateCmd {
    fn name(&self) -> &str {
        "mutate"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        let opt = MutateArgs::try_parse_from(args)?;
        if opt.min_pct > opt.max_pct {
            return Err(CommandError::invalid(format!(
                "min pct {} exceeds max pct {}",
                opt.min_pct, opt.max_pct
            )));
        }

        for arg in &opt.files {
            let (side, names) = split_side_arg(arg)?;
            for nm in names {
                let path = env.resolve(side, &nm);
                let m = mutate(&path, opt.min_pct, opt.max_pct)?;
                debug!(
                    "mutate {}: {} of {} bytes (append {})",
                    path.display(),
                    m.writes,
                    m.size,
                    m.appended
                );
            }
        }
        Ok(())
    }
}
