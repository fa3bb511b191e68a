//! `sync` and `touch`
//!
//! Both stamp every file and directory of lhs and rhs with the test's start
//! time, so later fixture steps start from identical metadata.

use super::Command;
use crate::errors::CommandError;
use crate::fixtures::retime_tree;
use crate::runtime::env::TestEnv;
use tracing::debug;

fn retime(env: &TestEnv, verb: &str, args: &[String]) -> Result<(), CommandError> {
    if !args.is_empty() {
        debug!("{}: ignoring arguments {:?}", verb, args);
    }
    retime_tree(&[env.lhs.as_path(), env.rhs.as_path()], env.start)
}

pub struct SyncCmd;

impl Command for SyncCmd {
    fn name(&self) -> &str {
        "sync"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        retime(env, self.name(), args)
    }
}

pub struct TouchCmd;

impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        retime(env, self.name(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use std::fs;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_sync_stamps_both_trees() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "sync.t", &HarnessConfig::default()).unwrap();
        fs::create_dir(env.lhs.join("d")).unwrap();
        fs::write(env.lhs.join("d/f"), b"x").unwrap();
        fs::write(env.rhs.join("g"), b"y").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        retime_tree(&[env.lhs.as_path(), env.rhs.as_path()], old).unwrap();

        SyncCmd.run(&env, &[]).unwrap();

        for p in [
            env.lhs.clone(),
            env.lhs.join("d"),
            env.lhs.join("d/f"),
            env.rhs.join("g"),
        ] {
            let mtime = fs::metadata(&p).unwrap().modified().unwrap();
            assert_eq!(mtime, env.start, "{}", p.display());
        }
    }

    #[test]
    fn test_touch_is_sync() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "touch.t", &HarnessConfig::default()).unwrap();
        fs::write(env.rhs.join("f"), b"x").unwrap();

        TouchCmd.run(&env, &[]).unwrap();
        let mtime = fs::metadata(env.rhs.join("f")).unwrap().modified().unwrap();
        assert_eq!(mtime, env.start);
    }
}
