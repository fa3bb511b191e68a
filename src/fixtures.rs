//! Filesystem primitives used by the fixture commands.
//!
//! Nothing here knows about lhs/rhs or the DSL; callers pass absolute paths.

use crate::errors::CommandError;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::fs::{self, DirBuilder, File, FileTimes, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Random file content is written in chunks of this size.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Probability that [`mutate`] also grows the file.
pub const APPEND_PROBABILITY: f64 = 0.3;

/// Upper bound for the mutation percentages.
pub const MAX_MUTATE_PCT: u64 = 100;

type Result<T> = std::result::Result<T, CommandError>;

// ============================================================================
// RANDOMNESS
// ============================================================================

/// Fills `buf` from the operating system's CSPRNG.
pub fn rand_bytes(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

pub fn rand_buf(n: usize) -> Vec<u8> {
    let mut b = vec![0u8; n];
    rand_bytes(&mut b);
    b
}

/// `n` random bytes rendered as lowercase hex.
pub fn rand_hex(n: usize) -> String {
    rand_buf(n).iter().map(|b| format!("{:02x}", b)).collect()
}

// ============================================================================
// CREATION
// ============================================================================

/// `mkdir -p` with mode 0700; an existing directory is fine.
pub fn make_dir(path: &Path) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
        .map_err(|e| CommandError::io("mkdir", path, e))
}

/// Creates `path` with `size` random bytes and stamps it with `time`.
///
/// Parent directories are created as needed. The file must not exist: an
/// existing fixture is never truncated or overwritten.
pub fn make_file(path: &Path, size: u64, time: SystemTime) -> Result<()> {
    if let Some(dir) = path.parent() {
        make_dir(dir)?;
    }

    let mut fd = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => CommandError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => CommandError::io("create", path, e),
        })?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut left = size;
    while left > 0 {
        let n = left.min(CHUNK_SIZE as u64) as usize;
        rand_bytes(&mut buf[..n]);
        fd.write_all(&buf[..n])
            .map_err(|e| CommandError::io("write", path, e))?;
        left -= n as u64;
    }

    fd.sync_all().map_err(|e| CommandError::io("sync", path, e))?;
    fd.set_times(times(time))
        .map_err(|e| CommandError::io("utimes", path, e))?;
    Ok(())
}

// ============================================================================
// COPY
// ============================================================================

/// Copies one entry from `src` to `dst`.
///
/// Directories are recreated with the source's permission bits, symlinks are
/// recreated pointing at the same target, and regular files are copied
/// byte for byte. Timestamps are not carried over.
pub fn copy_entry(dst: &Path, src: &Path) -> Result<()> {
    let lst = fs::symlink_metadata(src).map_err(|e| CommandError::io("stat", src, e))?;
    let ft = lst.file_type();

    if ft.is_dir() {
        return DirBuilder::new()
            .recursive(true)
            .mode(lst.permissions().mode() & 0o7777)
            .create(dst)
            .map_err(|e| CommandError::io("mkdir", dst, e));
    }

    if let Some(dir) = dst.parent() {
        make_dir(dir)?;
    }

    if ft.is_symlink() {
        let target = fs::read_link(src).map_err(|e| CommandError::io("readlink", src, e))?;
        return std::os::unix::fs::symlink(&target, dst)
            .map_err(|e| CommandError::io("symlink", dst, e));
    }

    let mut rfd = File::open(src).map_err(|e| CommandError::io("open", src, e))?;
    let mut wfd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(dst)
        .map_err(|e| CommandError::io("open", dst, e))?;

    let n = io::copy(&mut rfd, &mut wfd).map_err(|e| CommandError::io("copy", dst, e))?;
    if n != lst.len() {
        return Err(CommandError::invalid(format!(
            "copy {}: exp {} bytes, saw {}",
            dst.display(),
            lst.len(),
            n
        )));
    }
    Ok(())
}

/// Copies the whole tree under `src` into `dst`, parents before children.
pub fn copy_tree(dst: &Path, src: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| CommandError::Walk {
            root: src.to_path_buf(),
            source: e,
        })?;
        let rel = entry.path().strip_prefix(src).map_err(|_| {
            CommandError::invalid(format!(
                "{}: outside {}",
                entry.path().display(),
                src.display()
            ))
        })?;
        copy_entry(&dst.join(rel), entry.path())?;
    }
    Ok(())
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

fn times(t: SystemTime) -> FileTimes {
    FileTimes::new().set_accessed(t).set_modified(t)
}

/// Sets atime and mtime of `path` (following symlinks).
pub fn set_file_times(path: &Path, t: SystemTime) -> Result<()> {
    let fd = File::open(path).map_err(|e| CommandError::io("adjtime", path, e))?;
    fd.set_times(times(t))
        .map_err(|e| CommandError::io("adjtime", path, e))
}

/// Stamps every entry under `roots` with `t`.
///
/// Two passes over all roots: every non-directory first, then every
/// directory. Symlinks are skipped.
pub fn retime_tree(roots: &[&Path], t: SystemTime) -> Result<()> {
    for root in roots {
        walk(root, |entry| {
            let ft = entry.file_type();
            if !ft.is_dir() && !ft.is_symlink() {
                set_file_times(entry.path(), t)?;
            }
            Ok(())
        })?;
    }

    for root in roots {
        walk(root, |entry| {
            if entry.file_type().is_dir() {
                set_file_times(entry.path(), t)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn walk<F>(root: &Path, mut f: F) -> Result<()>
where
    F: FnMut(&walkdir::DirEntry) -> Result<()>,
{
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| CommandError::Walk {
            root: root.to_path_buf(),
            source: e,
        })?;
        f(&entry)?;
    }
    Ok(())
}

// ============================================================================
// MUTATION
// ============================================================================

/// What [`mutate`] did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// Size before mutation.
    pub size: u64,
    /// Number of random writes (offsets may repeat).
    pub writes: u64,
    /// Whether the random buffer was also appended.
    pub appended: bool,
}

/// Number of bytes to overwrite: uniform in `[size*min/100, size*max/100)`.
///
/// When the range is empty the lower bound is used. Percentages above
/// [`MAX_MUTATE_PCT`] are rejected.
pub fn mutation_count<R: Rng>(
    size: u64,
    min_pct: u64,
    max_pct: u64,
    rng: &mut R,
) -> Result<u64> {
    if min_pct > MAX_MUTATE_PCT || max_pct > MAX_MUTATE_PCT {
        return Err(CommandError::invalid(format!(
            "mutate: percentages must be at most {}, got {}..{}",
            MAX_MUTATE_PCT, min_pct, max_pct
        )));
    }

    let share = |pct: u64| {
        size.checked_mul(pct)
            .map(|n| n / 100)
            .ok_or_else(|| CommandError::invalid(format!("mutate: {} bytes is too large", size)))
    };
    let lo = share(min_pct)?;
    let hi = share(max_pct)?;
    Ok(if hi > lo { rng.gen_range(lo..hi) } else { lo })
}

/// Mutates `path` in place, changing between `min_pct` and `max_pct` percent of its bytes.
pub fn mutate(path: &Path, min_pct: u64, max_pct: u64) -> Result<Mutation> {
    mutate_with(path, min_pct, max_pct, &mut rand::thread_rng())
}

/// [`mutate`] with a caller supplied random source.
///
/// Offsets are drawn with replacement from the original extent of the file.
/// With probability [`APPEND_PROBABILITY`] the same random buffer is appended.
/// The file's atime and mtime are set to the current time afterwards.
pub fn mutate_with<R: Rng>(
    path: &Path,
    min_pct: u64,
    max_pct: u64,
    rng: &mut R,
) -> Result<Mutation> {
    let mut fd = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| CommandError::io("open", path, e))?;

    let mut data = Vec::new();
    fd.read_to_end(&mut data)
        .map_err(|e| CommandError::io("read", path, e))?;
    let size = data.len() as u64;

    let writes = mutation_count(size, min_pct, max_pct, rng)?;
    let mut buf = vec![0u8; writes as usize];
    rng.fill_bytes(&mut buf);

    for &b in &buf {
        let off = rng.gen_range(0..size) as usize;
        data[off] = b;
    }

    fd.seek(SeekFrom::Start(0))
        .and_then(|_| fd.write_all(&data))
        .map_err(|e| CommandError::io("write", path, e))?;

    let appended = rng.gen_bool(APPEND_PROBABILITY);
    if appended {
        fd.seek(SeekFrom::End(0))
            .and_then(|_| fd.write_all(&buf))
            .map_err(|e| CommandError::io("append", path, e))?;
    }

    fd.set_times(times(SystemTime::now()))
        .map_err(|e| CommandError::io("utimes", path, e))?;

    Ok(Mutation {
        size,
        writes,
        appended,
    })
}

// ============================================================================
// INSPECTION & REMOVAL
// ============================================================================

/// True if something (of any type, including a dangling symlink) exists at `path`.
pub fn lexists(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// `rm -rf`; a missing tree is not an error.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        r => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_hex_length() {
        let s = rand_hex(4);
        assert_eq!(s.len(), 8);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_mutation_count_empty_range() {
        let mut rng = rand::thread_rng();
        assert_eq!(mutation_count(1000, 10, 10, &mut rng).unwrap(), 100);
        assert_eq!(mutation_count(0, 10, 20, &mut rng).unwrap(), 0);
    }

    #[test]
    fn test_mutation_count_rejects_huge_percentages() {
        let mut rng = rand::thread_rng();
        assert!(mutation_count(1000, 10, u64::MAX / 100, &mut rng).is_err());
        assert!(mutation_count(1000, 101, 101, &mut rng).is_err());
        assert_eq!(mutation_count(u64::MAX, 100, 100, &mut rng).ok(), None);
        assert_eq!(mutation_count(1000, 100, 100, &mut rng).unwrap(), 1000);
    }

    #[test]
    fn test_remove_tree_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_tree(&dir.path().join("nope")).is_ok());
    }

    #[test]
    fn test_lexists_sees_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("missing"), &link).unwrap();
        assert!(lexists(&link).unwrap());
        assert!(!link.exists());
    }
}
