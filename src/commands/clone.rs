//! `clone [NAME...]`
//!
//! Copies lhs into rhs: the whole tree when no names are given, otherwise
//! each named entry (directories recursively). Names must be relative.

use super::Command;
use crate::errors::CommandError;
use crate::fixtures::{copy_entry, copy_tree};
use crate::runtime::env::{Side, TestEnv};
use std::fs;
use std::path::Path;
use tracing::debug;

pub struct CloneCmd;

impl Command for CloneCmd {
    fn name(&self) -> &str {
        "clone"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        if args.is_empty() {
            debug!("clone {} -> {}", env.lhs.display(), env.rhs.display());
            return copy_tree(&env.rhs, &env.lhs);
        }

        for nm in args {
            if Path::new(nm).is_absolute() {
                return Err(CommandError::invalid(format!(
                    "{}: common file can't be absolute",
                    nm
                )));
            }

            let src = env.resolve(Side::Lhs, nm);
            let dst = env.resolve(Side::Rhs, nm);
            let is_dir = fs::symlink_metadata(&src)
                .map_err(|e| CommandError::io("stat", &src, e))?
                .is_dir();

            debug!("clone {} -> {}", src.display(), dst.display());
            if is_dir {
                copy_tree(&dst, &src)?;
            } else {
                copy_entry(&dst, &src)?;
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
    fn test_clone_whole_tree() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "all.t", &HarnessConfig::default()).unwrap();
        fs::create_dir_all(env.lhs.join("a/b")).unwrap();
        fs::write(env.lhs.join("a/b/f"), b"payload").unwrap();
        std::os::unix::fs::symlink("f", env.lhs.join("a/b/l")).unwrap();

        CloneCmd.run(&env, &[]).unwrap();

        assert_eq!(fs::read(env.rhs.join("a/b/f")).unwrap(), b"payload");
        assert_eq!(
            fs::read_link(env.rhs.join("a/b/l")).unwrap(),
            Path::new("f")
        );
    }

    #[test]
    fn test_clone_named_entries() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "some.t", &HarnessConfig::default()).unwrap();
        fs::write(env.lhs.join("one"), b"1").unwrap();
        fs::write(env.lhs.join("two"), b"2").unwrap();

        CloneCmd.run(&env, &["one".to_string()]).unwrap();

        assert_eq!(fs::read(env.rhs.join("one")).unwrap(), b"1");
        assert!(!env.rhs.join("two").exists());
        assert!(CloneCmd.run(&env, &["/etc/passwd".to_string()]).is_err());
    }
}
