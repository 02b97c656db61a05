//! CLI command implementations.

use anyhow::{Context, Result};
use quotesync_lib::StorageLayout;
use std::path::PathBuf;

pub(crate) mod show;
pub(crate) mod symbols;
pub(crate) mod sync;

/// Opens the data directory, creating it on first use.
pub(crate) fn open_layout(data_dir: Option<PathBuf>) -> Result<StorageLayout> {
    let root = data_dir.unwrap_or_else(StorageLayout::default_path);
    StorageLayout::ensure(&root)
        .with_context(|| format!("Failed to open data directory {}", root.display()))
}
