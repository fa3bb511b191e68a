//! `mkfile [-m MIN] [-M MAX] [-d] [-t lhs|rhs|both] NAME...`
//!
//! Creates random files (or directories with `-d`). File sizes are drawn
//! uniformly from `[MIN, MAX)`. With `-t both` each entry is created in lhs
//! and then copied to rhs, so both sides hold identical bytes.

use super::{parse_size, Command};
use crate::errors::CommandError;
use crate::fixtures::{copy_entry, make_dir, make_file};
use crate::runtime::env::{Side, TestEnv};
use clap::{Parser, ValueEnum};
use rand::Rng;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Lhs,
    Rhs,
    Both,
}

#[derive(Debug, Parser)]
#[command(
    name = "mkfile",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct MkfileArgs {
    /// Minimum file size
    #[arg(short = 'm', long = "min-file-size", default_value = "1k", value_parser = parse_size)]
    min: u64,

    /// Maximum file size
    #[arg(short = 'M', long = "max-file-size", default_value = "8k", value_parser = parse_size)]
    max: u64,

    /// Make directories instead of files
    #[arg(short = 'd', long = "dir")]
    dir: bool,

    /// Where to create the entries
    #[arg(short = 't', long = "target", value_enum, default_value = "lhs")]
    target: Target,

    #[arg(required = true)]
    names: Vec<String>,
}

pub struct MkfileCmd;

impl Command for MkfileCmd {
    fn name(&self) -> &str {
        "mkfile"
    }

    fn run(&self, env: &TestEnv, args: &[String]) -> Result<(), CommandError> {
        let opt = MkfileArgs::try_parse_from(args)?;
        if opt.min > opt.max {
            return Err(CommandError::invalid(format!(
                "min size {} exceeds max size {}",
                opt.min, opt.max
            )));
        }

        let side = match opt.target {
            Target::Rhs => Side::Rhs,
            Target::Lhs | Target::Both => Side::Lhs,
        };
        if opt.target == Target::Both {
            if let Some(nm) = opt.names.iter().find(|n| Path::new(n).is_absolute()) {
                return Err(CommandError::invalid(format!(
                    "{}: common file can't be absolute",
                    nm
                )));
            }
        }

        let mut rng = rand::thread_rng();
        for nm in &opt.names {
            let path = env.resolve(side, nm);
            if opt.dir {
                debug!("mkdir {}", path.display());
                make_dir(&path)?;
                continue;
            }

            let size = if opt.max > opt.min {
                rng.gen_range(opt.min..opt.max)
            } else {
                opt.min
            };
            debug!("mkfile {} ({} bytes)", path.display(), size);
            make_file(&path, size, env.start)?;
        }

        if opt.target == Target::Both {
            for nm in &opt.names {
                let src = env.resolve(Side::Lhs, nm);
                let dst = env.resolve(Side::Rhs, nm);
                debug!("clone {} -> {}", src.display(), dst.display());
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
    use std::fs;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mkfile_sizes_within_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "mk.t", &HarnessConfig::default()).unwrap();

        MkfileCmd
            .run(&env, &args(&["-m", "100", "-M", "200", "a", "sub/b"]))
            .unwrap();

        for nm in ["a", "sub/b"] {
            let len = fs::metadata(env.lhs.join(nm)).unwrap().len();
            assert!((100..200).contains(&len), "{} has {} bytes", nm, len);
            assert!(!env.rhs.join(nm).exists());
        }
    }

    #[test]
    fn test_mkfile_both_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "both.t", &HarnessConfig::default()).unwrap();

        MkfileCmd
            .run(&env, &args(&["-t", "both", "-m", "1k", "-M", "2k", "x", "y/z"]))
            .unwrap();

        for nm in ["x", "y/z"] {
            let l = fs::read(env.lhs.join(nm)).unwrap();
            let r = fs::read(env.rhs.join(nm)).unwrap();
            assert_eq!(l, r);
        }
    }

    #[test]
    fn test_mkfile_dirs_on_rhs() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "d.t", &HarnessConfig::default()).unwrap();

        MkfileCmd
            .run(&env, &args(&["-d", "-t", "rhs", "p/q"]))
            .unwrap();
        assert!(env.rhs.join("p/q").is_dir());
        assert!(!env.lhs.join("p").exists());
    }

    #[test]
    fn test_mkfile_rejects_bad_usage() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "bad.t", &HarnessConfig::default()).unwrap();

        assert!(matches!(
            MkfileCmd.run(&env, &args(&["-t", "sideways", "a"])),
            Err(CommandError::Usage(_))
        ));
        assert!(MkfileCmd.run(&env, &args(&["-m", "8k", "-M", "1k", "a"])).is_err());
        assert!(MkfileCmd.run(&env, &args(&["-t", "both", "/abs"])).is_err());
        assert!(MkfileCmd.run(&env, &[]).is_err());
    }

    #[test]
    fn test_mkfile_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let env = TestEnv::build(dir.path(), "dup.t", &HarnessConfig::default()).unwrap();

        MkfileCmd.run(&env, &args(&["f"])).unwrap();
        let before = fs::read(env.lhs.join("f")).unwrap();
        let err = MkfileCmd.run(&env, &args(&["f"])).unwrap_err();
        assert!(matches!(err, CommandError::AlreadyExists { .. }));
        assert_eq!(fs::read(env.lhs.join("f")).unwrap(), before);
    }
}
