use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{HarnessError, Result};

/// Extension of synctest test files.
pub const TEST_EXTENSION: &str = "t";

/// Finds test files on disk.
///
/// Directories are scanned recursively for `*.t` files; a path naming a file
/// is taken as-is whatever its extension.
#[derive(Debug)]
pub struct TestDiscoverer;

impl TestDiscoverer {
    /// Expands every input path, preserving the order of the inputs.
    pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                files.extend(Self::discover_test_files(path)?);
            } else {
                files.push(path.clone());
            }
        }
        Ok(files)
    }

    /// Recursively scans a directory for test files.
    ///
    /// The returned list is sorted so runs are deterministic.
    pub fn discover_test_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| HarnessError::Discover {
                root: root.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::is_test_file(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    fn is_test_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(TEST_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.t"), "").unwrap();
        fs::write(dir.path().join("sub/a.t"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = TestDiscoverer::discover_test_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.t"), dir.path().join("sub/a.t")]
        );
    }

    #[test]
    fn test_explicit_file_kept_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("script.txt");
        fs::write(&odd, "").unwrap();

        let files = TestDiscoverer::discover(&[odd.clone()]).unwrap();
        assert_eq!(files, vec![odd]);
    }
}
