//! Symbols command implementation.
//!
//! Lists every validated symbol together with the dates its stored history
//! covers.

use anyhow::{Context, Result};
use quotesync_lib::prelude::*;
use quotesync_lib::{SymbolRegistry, TimeSeriesStore};

/// List validated symbols and their stored coverage.
pub(crate) async fn list_symbols(layout: StorageLayout) -> Result<()> {
    let registry = SymbolRegistry::open(&layout)
        .await
        .context("Failed to open symbol registry")?;
    let store = TimeSeriesStore::new(layout);

    let records = registry.records().await;
    if records.is_empty() {
        println!("No symbols registered.");
        return Ok(());
    }

    println!(
        "{:<10} {:<32} {:>7} {:<10} {:<10}",
        "SYMBOL", "ABOUT", "BARS", "FIRST", "LAST"
    );
    println!("{}", "-".repeat(73));

    for record in &records {
        let lookup = store
            .load(record.symbol())
            .await
            .with_context(|| format!("Failed to read stored history for {}", record.symbol()))?;
        let (bars, first, last) = match lookup {
            Lookup::Found(series) => (
                series.len().to_string(),
                series.first_date().map(|d| d.to_string()).unwrap_or_default(),
                series.last_date().map(|d| d.to_string()).unwrap_or_default(),
            ),
            Lookup::NotFound => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        println!(
            "{:<10} {:<32} {:>7} {:<10} {:<10}",
            record.symbol().as_str(),
            truncate(record.about(), 32),
            bars,
            first,
            last
        );
    }

    println!("\nTotal: {} symbols", records.len());
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
