//! Sync command implementation.
//!
//! Validates each symbol, downloads missing histories and appends new bars to
//! existing ones, several symbols at a time.

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use quotesync_lib::prelude::*;
use quotesync_lib::{HttpClient, YahooConfig};
use std::sync::Arc;
use std::time::Duration;

use crate::display::describe_outcome;

/// Synchronize the given symbols against Yahoo Finance.
pub(crate) async fn sync(
    layout: StorageLayout,
    symbols: Vec<String>,
    parallel: usize,
    timeout: u64,
    retries: u32,
    quiet: bool,
) -> Result<()> {
    let config = ClientConfig {
        timeout: Duration::from_secs(timeout),
        max_retries: retries,
        ..Default::default()
    };
    let client = HttpClient::new(config).context("Failed to create HTTP client")?;
    let source = Arc::new(YahooSource::new(client, YahooConfig::default()));

    let engine = SyncEngine::open(layout, source)
        .await
        .context("Failed to open symbol registry")?
        .with_config(EngineConfig {
            parallelism: parallel,
        });

    let total = symbols.len();
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} symbols {msg}")
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        pb
    };

    let mut failures = Vec::new();
    let mut stream = std::pin::pin!(engine.sync_stream(symbols));
    while let Some((symbol, result)) = stream.next().await {
        match result {
            Ok(report) => {
                progress.set_message(report.symbol.to_string());
                if !quiet {
                    progress.println(describe_outcome(&report));
                }
            }
            Err(e) => {
                progress.println(format!("{symbol:<10} failed: {e}"));
                failures.push((symbol, e));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if !quiet {
        println!("\nSync complete:");
        println!("  Successful: {}", total - failures.len());
        if !failures.is_empty() {
            println!("  Failed: {}", failures.len());
            for (symbol, e) in &failures {
                let hint = if e.is_retryable() { " (retry later)" } else { "" };
                println!("    {symbol}: {e}{hint}");
            }
        }
    }

    if !failures.is_empty() {
        bail!("{} out of {} symbols failed", failures.len(), total);
    }

    Ok(())
}
