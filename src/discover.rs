//! Finding torrent files on disk.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::FsOperation;
use crate::{Error, Result};

/// Extension used when none is given.
pub const DEFAULT_EXTENSION: &str = ".torrent";

/// Files found by [`discover`], plus whatever could not be read on the way.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Matching files, in walk order.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read.
    pub errors: Vec<Error>,
}

impl Discovery {
    /// Returns `true` if no entry failed.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Appends another discovery's files and errors.
    pub fn extend(&mut self, other: Discovery) {
        self.files.extend(other.files);
        self.errors.extend(other.errors);
    }

    /// Returns the files, or the first error if any entry failed.
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.files),
        }
    }
}

/// Collects files below `path` whose name ends in `extension`.
///
/// A `path` naming a regular file is returned as-is whatever its
/// extension. Directories are walked recursively in file-name order
/// without following symlinks. `None` means [`DEFAULT_EXTENSION`].
///
/// Unreadable entries do not stop the walk; they are collected in
/// [`Discovery::errors`].
pub fn discover(path: impl AsRef<Path>, extension: Option<&str>) -> Discovery {
    let root = path.as_ref();
    let extension = extension.unwrap_or(DEFAULT_EXTENSION);
    let mut found = Discovery::default();

    if root.is_file() {
        found.files.push(root.to_path_buf());
        return found;
    }

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let at = e.path().unwrap_or(root).to_path_buf();
                found
                    .errors
                    .push(Error::fs(at, FsOperation::Walk, io::Error::from(e)));
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            found.files.push(entry.into_path());
        }
    }

    debug!(
        "found {} '{}' files under {}",
        found.files.len(),
        extension,
        root.display()
    );
    found
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(extension.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walks_sorted_and_filters() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.torrent"), b"de").unwrap();
        fs::write(dir.path().join("a.torrent"), b"de").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("sub/c.torrent"), b"de").unwrap();

        let found = discover(dir.path(), None);
        assert!(found.is_complete());
        let names: Vec<_> = found
            .files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.torrent"),
                PathBuf::from("b.torrent"),
                PathBuf::from("sub/c.torrent"),
            ]
        );
    }

    #[test]
    fn test_single_file_ignores_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.dat");
        fs::write(&path, b"de").unwrap();
        let found = discover(&path, None);
        assert_eq!(found.files, vec![path]);
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.fastresume"), b"de").unwrap();
        fs::write(dir.path().join("x.torrent"), b"de").unwrap();
        let found = discover(dir.path(), Some(".fastresume"));
        assert_eq!(found.files.len(), 1);
        assert!(found.files[0].ends_with("x.fastresume"));
    }

    #[test]
    fn test_missing_root_is_collected() {
        let dir = TempDir::new().unwrap();
        let found = discover(dir.path().join("nope"), None);
        assert!(found.files.is_empty());
        assert_eq!(found.errors.len(), 1);
        assert!(found.into_result().is_err());
    }
}
