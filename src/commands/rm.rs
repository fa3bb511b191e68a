//! `rm lhs="a b" rhs="c"`
//!
//! Removes files, symlinks or empty directories. Every named entry must exist.

use super::{split_side_arg, Command};
use crate::errors::CommandError;
use crate::fixtures::lexists;
use crate::runtime::env::TestEnv;
use std::fs;
use tracing::debug;

pub struct RmCmd;

impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage("rm: no entries named".to_string()));
        }

        for arg in args {
            let (side, names) = split_side_arg(arg)?;
            for nm in names {
                let path = env.resolve(side, &nm);
                let exists = lexists(&path).map_err(|e| CommandError::io("stat", &path, e))?;
                if !exists {
                    return Err(CommandError::NotFound { path });
                }

                debug!("rm {}", path.display());
                let is_dir = fs::symlink_metadata(&path)
                    .map_err(|e| CommandError::io("stat", &path, e))?
                    .is_dir();
                let res = if is_dir {
                    fs::remove_dir(&path)
                } else {
                    fs::remove_file(&path)
                };
                res.map_err(|e| CommandError::io("rm", &path, e))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;

    #[test]
    fn test_rm_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "rm.t", &HarnessConfig::default()).unwrap();
        fs::write(env.lhs.join("a"), b"1").unwrap();
        fs::write(env.lhs.join("b"), b"2").unwrap();
        fs::create_dir(env.rhs.join("d")).unwrap();

        RmCmd
            .run(&env, &["lhs=a b".to_string(), "rhs=d".to_string()])
            .unwrap();
        assert!(!env.lhs.join("a").exists());
        assert!(!env.lhs.join("b").exists());
        assert!(!env.rhs.join("d").exists());
    }

    #[test]
    fn test_rm_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "miss.t", &HarnessConfig::default()).unwrap();

        let err = RmCmd.run(&env, &["lhs=ghost".to_string()]).unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
        assert!(err.to_string().ends_with("ghost: doesn't exist"));
    }

    #[test]
    fn test_rm_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "key.t", &HarnessConfig::default()).unwrap();

        let err = RmCmd.run(&env, &["mid=a".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "unknown keyword mid");
    }
}
