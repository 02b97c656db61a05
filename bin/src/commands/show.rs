//! Show command implementation.

use anyhow::{Context, Result, bail};
use quotesync_lib::prelude::*;
use quotesync_lib::TimeSeriesStore;

use crate::display::{Format, print_bars};

/// Print the stored history of a symbol without contacting the source.
pub(crate) async fn show(
    layout: StorageLayout,
    symbol: &str,
    tail: Option<usize>,
    format: Format,
) -> Result<()> {
    let symbol = Symbol::new(symbol).with_context(|| format!("Invalid symbol: {symbol}"))?;
    let store = TimeSeriesStore::new(layout);

    let Lookup::Found(series) = store
        .load(&symbol)
        .await
        .with_context(|| format!("Failed to read stored history for {symbol}"))?
    else {
        bail!("No stored history for {symbol}. Run `quotesync sync {symbol}` first.");
    };

    let bars = series.bars();
    let skip = tail.map_or(0, |n| bars.len().saturating_sub(n));
    print_bars(&bars[skip..], format)
}
