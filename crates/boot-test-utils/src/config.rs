//! [`TempConfigFile`]: a TOML configuration file in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A configuration file that is removed with its directory on drop.
pub struct TempConfigFile {
    _dir: TempDir,
    path: PathBuf,
}

impl TempConfigFile {
    /// Write `contents` to `boot.toml` in a new temporary directory.
    pub fn new(contents: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boot.toml");
        fs::write(&path, contents).unwrap();
        Self { _dir: dir, path }
    }

    /// A path inside a temporary directory where no file exists.
    pub fn missing() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
