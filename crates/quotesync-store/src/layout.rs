//! On-disk layout of the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use quotesync_types::Symbol;

use crate::{Result, StoreError};

/// File name of the symbol registry inside the data directory.
pub const REGISTRY_FILE: &str = "symbols.csv";

/// File locked while the registry is rewritten.
pub const REGISTRY_LOCK_FILE: &str = ".symbols.lock";

/// Directory holding one CSV file per symbol.
pub const SERIES_DIR: &str = "series";

/// Paths for everything quotesync persists.
///
/// The registry lives at `<root>/symbols.csv` and each series at
/// `<root>/series/<symbol>.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
    series_dir: PathBuf,
}

impl StorageLayout {
    /// Opens a layout rooted at `root`, creating missing directories.
    ///
    /// Calling this on an existing data directory is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn ensure(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let series_dir = root.join(SERIES_DIR);

        for path in [&root, &series_dir] {
            if !path.exists() {
                fs::create_dir_all(path).map_err(|e| StoreError::CreateDir {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        Ok(Self { root, series_dir })
    }

    /// Returns the default data directory.
    ///
    /// Uses the platform data directory, falling back to `~/.quotesync`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "quotesync").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Opens the layout at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::ensure(Self::default_path())
    }

    /// Returns the data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding series files.
    #[must_use]
    pub fn series_dir(&self) -> &Path {
        &self.series_dir
    }

    /// Returns the path of the symbol registry.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Returns the path of the lock file guarding registry rewrites.
    #[must_use]
    pub fn registry_lock_path(&self) -> PathBuf {
        self.root.join(REGISTRY_LOCK_FILE)
    }

    /// Returns the path of a symbol's series file.
    #[must_use]
    pub fn series_path(&self, symbol: &Symbol) -> PathBuf {
        self.series_dir.join(format!("{symbol}.csv"))
    }

    /// Returns the path of the lock file guarding a symbol's series.
    #[must_use]
    pub fn series_lock_path(&self, symbol: &Symbol) -> PathBuf {
        self.series_dir.join(format!(".{symbol}.lock"))
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".quotesync")
}
