//! Advisory locks shared between processes using one data directory.

use std::fs::{File, OpenOptions};
use std::path::Path;

use fs4::fs_std::FileExt;
use tracing::trace;

use crate::{Result, StoreError};

/// An exclusive advisory lock, held until dropped.
///
/// Closing the file releases the lock, so dropping the guard is enough.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Blocks on a worker thread until the lock on `path` is granted,
    /// creating the lock file if needed.
    pub(crate) async fn acquire(path: &Path) -> Result<Self> {
        let owned = path.to_path_buf();
        let file = tokio::task::spawn_blocking(move || lock_exclusive(&owned))
            .await
            .map_err(|e| StoreError::Lock {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })??;

        trace!(path = %path.display(), "acquired file lock");
        Ok(Self { _file: file })
    }
}

fn lock_exclusive(path: &Path) -> Result<File> {
    let lock_err = |source| StoreError::Lock {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(lock_err)?;
    FileExt::lock_exclusive(&file).map_err(lock_err)?;
    Ok(file)
}
