//! Display utilities and output formatting for the quotesync CLI.

use anyhow::Result;
use clap::ValueEnum;
use quotesync_lib::prelude::*;
use std::io::{self, Write};

/// Output format for printed bars.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Table,
    Csv,
    Json,
}

/// Print bars to stdout in the given format.
pub(crate) fn print_bars(bars: &[Bar], format: Format) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        Format::Table => {
            writeln!(
                out,
                "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14}",
                "DATE", "OPEN", "HIGH", "LOW", "CLOSE", "ADJ CLOSE", "VOLUME"
            )?;
            writeln!(out, "{}", "-".repeat(92))?;
            for bar in bars {
                writeln!(
                    out,
                    "{:<10} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>14}",
                    bar.date,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.adjusted_close,
                    bar.volume
                )?;
            }
        }
        Format::Csv => {
            writeln!(out, "Date,Open,High,Low,Close,Adj Close,Volume")?;
            for bar in bars {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{}",
                    bar.date,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.adjusted_close,
                    bar.volume
                )?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, bars)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// One-line summary of a completed sync.
pub(crate) fn describe_outcome(report: &SyncReport) -> String {
    let last = report
        .series
        .last_date()
        .map_or_else(|| "no data".to_string(), |d| format!("through {d}"));

    match report.outcome {
        SyncOutcome::Downloaded { bars } => {
            format!("{:<10} downloaded {bars} bars ({last})", report.symbol.as_str())
        }
        SyncOutcome::Updated { added } => {
            format!("{:<10} added {added} bars ({last})", report.symbol.as_str())
        }
        SyncOutcome::UpToDate => format!("{:<10} up to date ({last})", report.symbol.as_str()),
    }
}
