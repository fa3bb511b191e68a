//! `symlink lhs="NEW@OLD ..." rhs="NEW@OLD ..."`
//!
//! Creates `NEW` as a symbolic link to `OLD`. Relative names on either side
//! of the `@` resolve under the same tree; parents of `NEW` are created.

use super::{split_side_arg, Command};
use crate::errors::CommandError;
use crate::fixtures::make_dir;
use crate::runtime::env::TestEnv;
use std::os::unix::fs::symlink;
use tracing::debug;

pub struct SymlinkCmd;

impl Command for SymlinkCmd {
    fn name(&self) -> &str {
        "symlink"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage("symlink: no links named".to_string()));
        }

        for arg in args {
            let (side, pairs) = split_side_arg(arg)?;
            for pair in pairs {
                let (new, old) = pair.split_once('@').ok_or_else(|| {
                    CommandError::invalid(format!("symlink: {}: expected NEW@OLD", pair))
                })?;
                if new.is_empty() || old.is_empty() {
                    return Err(CommandError::invalid(format!(
                        "symlink: {}: expected NEW@OLD",
                        pair
                    )));
                }

                let new = env.resolve(side, new);
                let old = env.resolve(side, old);
                if let Some(dir) = new.parent() {
                    make_dir(dir)?;
                }

                debug!("symlink {} -> {}", new.display(), old.display());
                symlink(&old, &new).map_err(|e| CommandError::io("symlink", &new, e))?;
            }
        }
        Ok(())
    }
}
