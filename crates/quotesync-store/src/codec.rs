//! CSV encoding of stored files and atomic replacement.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv_async::{AsyncReaderBuilder, AsyncWriter, StringRecord};
use futures::StreamExt;
use quotesync_types::{Bar, DATE_FORMAT, Series, Symbol};
use tokio::fs::{self, File};
use uuid::Uuid;

use crate::{Result, StoreError};

/// Column header of every series file.
pub(crate) const SERIES_HEADER: [&str; 7] =
    ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// Column header of the registry file.
pub(crate) const REGISTRY_HEADER: [&str; 2] = ["symbol", "about"];

/// Formats a price as its shortest round-trip decimal, always with a
/// fractional part.
pub(crate) fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn bar_record(bar: &Bar) -> [String; 7] {
    [
        bar.date.format(DATE_FORMAT).to_string(),
        format_price(bar.open),
        format_price(bar.high),
        format_price(bar.low),
        format_price(bar.close),
        format_price(bar.adjusted_close),
        bar.volume.to_string(),
    ]
}

/// Writes a series file atomically.
pub(crate) async fn write_series(path: &Path, series: &Series) -> Result<()> {
    write_atomic(path, &SERIES_HEADER, series.iter().map(bar_record)).await
}

/// Writes the registry file atomically.
pub(crate) async fn write_registry(path: &Path, known: &BTreeMap<Symbol, String>) -> Result<()> {
    write_atomic(
        path,
        &REGISTRY_HEADER,
        known
            .iter()
            .map(|(symbol, about)| [symbol.as_str(), about.as_str()]),
    )
    .await
}

/// Reads a series file. Returns `None` if the file does not exist.
pub(crate) async fn read_series(path: &Path) -> Result<Option<Series>> {
    let Some(records) = read_records(path, &SERIES_HEADER).await? else {
        return Ok(None);
    };

    let bars = records
        .iter()
        .map(|(line, record)| decode_bar(record).map_err(|reason| corrupt(path, *line, reason)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Series::from_bars(bars)))
}

/// Reads the registry file. Returns `None` if the file does not exist.
pub(crate) async fn read_registry(path: &Path) -> Result<Option<BTreeMap<Symbol, String>>> {
    let Some(records) = read_records(path, &REGISTRY_HEADER).await? else {
        return Ok(None);
    };

    let mut known = BTreeMap::new();
    for (line, record) in &records {
        let symbol = Symbol::new(&record[0]).map_err(|e| corrupt(path, *line, e.to_string()))?;
        known.entry(symbol).or_insert_with(|| record[1].to_string());
    }
    Ok(Some(known))
}

fn decode_bar(record: &StringRecord) -> std::result::Result<Bar, String> {
    let date = NaiveDate::parse_from_str(&record[0], DATE_FORMAT)
        .map_err(|e| format!("invalid date '{}': {e}", &record[0]))?;
    let price = |i: usize| {
        record[i]
            .parse::<f64>()
            .map_err(|e| format!("invalid {} '{}': {e}", SERIES_HEADER[i], &record[i]))
    };
    let volume = record[6]
        .parse::<u64>()
        .map_err(|e| format!("invalid Volume '{}': {e}", &record[6]))?;

    Ok(Bar::new(
        date,
        price(1)?,
        price(2)?,
        price(3)?,
        price(4)?,
        price(5)?,
        volume,
    ))
}

async fn read_records(path: &Path, header: &[&str]) -> Result<Option<Vec<(u64, StringRecord)>>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .create_reader(file);

    let found = reader.headers().await.map_err(|e| csv_error(path, e))?;
    if !found.iter().eq(header.iter().copied()) {
        return Err(corrupt(
            path,
            1,
            format!("expected header {header:?}, found {:?}", found.iter().collect::<Vec<_>>()),
        ));
    }

    let mut records = reader.records();
    let mut out = Vec::new();
    while let Some(record) = records.next().await {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line = record.position().map_or(0, csv_async::Position::line);
        out.push((line, record));
    }
    Ok(Some(out))
}

/// Replaces `path` with the given rows.
///
/// The rows are written and synced to a uniquely named sibling, which is
/// then renamed over the target. A failed write leaves the target untouched.
async fn write_atomic<R, F>(path: &Path, header: &[&str], rows: R) -> Result<()>
where
    R: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<[u8]>,
{
    let tmp = tmp_path(path);

    if let Err(e) = write_records(&tmp, header, rows).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(StoreError::Replace {
            path: path.to_path_buf(),
            source: e,
        });
    }

    tracing::trace!(path = %path.display(), "replaced file");
    Ok(())
}

async fn write_records<R, F>(tmp: &Path, header: &[&str], rows: R) -> Result<()>
where
    R: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<[u8]>,
{
    let mut file = File::create(tmp).await.map_err(|e| StoreError::WriteFile {
        path: tmp.to_path_buf(),
        source: e,
    })?;

    {
        let mut writer = AsyncWriter::from_writer(&mut file);
        writer
            .write_record(header)
            .await
            .map_err(|e| csv_error(tmp, e))?;
        for row in rows {
            writer
                .write_record(row)
                .await
                .map_err(|e| csv_error(tmp, e))?;
        }
        writer.flush().await.map_err(|e| csv_error(tmp, e))?;
    }

    file.sync_all().await.map_err(|e| StoreError::WriteFile {
        path: tmp.to_path_buf(),
        source: e,
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

fn csv_error(path: &Path, e: impl Into<csv_async::Error>) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

fn corrupt(path: &Path, line: u64, reason: impl Into<String>) -> StoreError {
    StoreError::CorruptFile {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_series() -> Series {
        Series::from_bars([
            Bar::new(date(2024, 1, 3), 184.22, 185.88, 183.43, 184.25, 183.5, 58_414_500),
            Bar::new(date(2024, 1, 4), 182.15, 183.09, 180.88, 181.91, 181.2, 71_983_600),
        ])
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(10.0), "10.0");
        assert_eq!(format_price(184.22), "184.22");
        assert_eq!(format_price(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_price(-3.0), "-3.0");
    }

    #[tokio::test]
    async fn test_series_file_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("aapl.csv");

        write_series(&path, &sample_series()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,184.22,185.88,183.43,184.25,183.5,58414500\n\
             2024-01-04,182.15,183.09,180.88,181.91,181.2,71983600\n"
        );
    }

    #[tokio::test]
    async fn test_series_read_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("aapl.csv");
        write_series(&path, &sample_series()).await.unwrap();

        let series = read_series(&path).await.unwrap().unwrap();

        assert_eq!(series, sample_series());
        assert_relative_eq!(series.bars()[1].adjusted_close, 181.2);
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_series(&temp.path().join("nope.csv")).await.unwrap().is_none());
        assert!(read_registry(&temp.path().join("nope.csv")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_header_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.csv");
        std::fs::write(&path, "date,open\n2024-01-03,1.0\n").unwrap();

        let err = read_series(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptFile { line: 1, .. }));
    }

    #[tokio::test]
    async fn test_bad_cell_reports_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.csv");
        std::fs::write(
            &path,
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,1.0,1.0,1.0,1.0,1.0,10\n\
             2024-01-04,oops,1.0,1.0,1.0,1.0,10\n",
        )
        .unwrap();

        let err = read_series(&path).await.unwrap_err();
        match err {
            StoreError::CorruptFile { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("Open"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_registry_round_trip_preserves_commas() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("symbols.csv");
        let mut known = BTreeMap::new();
        known.insert(Symbol::new("brk-b").unwrap(), "Berkshire Hathaway, Inc.".to_string());

        write_registry(&path, &known).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "symbol,about\nbrk-b,\"Berkshire Hathaway, Inc.\"\n");

        assert_eq!(read_registry(&path).await.unwrap().unwrap(), known);
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("aapl.csv");

        write_series(&path, &sample_series()).await.unwrap();
        write_series(&path, &Series::new()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("aapl.csv")]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_contents() {
        let temp = TempDir::new().unwrap();
        // Fits the file name limit, but its temporary sibling does not.
        let path = temp.path().join(format!("{}.csv", "a".repeat(236)));
        std::fs::write(&path, "previous contents\n").unwrap();

        let err = write_series(&path, &sample_series()).await.unwrap_err();

        assert!(matches!(err, StoreError::WriteFile { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous contents\n");
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_parent_is_write_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("aapl.csv");

        let err = write_series(&path, &sample_series()).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteFile { .. }));
        assert!(!path.exists());
    }
}
