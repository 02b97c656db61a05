//! Shape filtering and numeric coercion of raw rows.
//!
//! Cells are cleaned by trimming surrounding whitespace and removing `,`
//! thousands separators before parsing. Rows shorter than [`MIN_CELLS`] are
//! dividend or split annotations and are dropped, as are rows with a blank
//! date cell; anything else that fails to coerce is a hard error.

use chrono::NaiveDate;
use quotesync_types::{Bar, DATE_FORMAT};
use thiserror::Error;

use crate::RawRow;

/// Rows with fewer cells than this are annotations and are skipped.
pub const MIN_CELLS: usize = 3;

/// Number of cells in a price row.
pub const ROW_CELLS: usize = 7;

/// Long-form date layout used by the quote history table (`Jan 5 2024`
/// once separators are removed).
const TABLE_DATE_FORMAT: &str = "%b %d %Y";

/// Errors that can occur while coercing raw rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A price row could not be coerced to a bar.
    #[error("Malformed row {row:?}: {reason}")]
    MalformedRow {
        /// The raw cells as received.
        row: RawRow,
        /// What failed to parse.
        reason: String,
    },
}

/// Returns true if the row has enough cells and a date to be a price row.
#[must_use]
pub fn is_price_row(row: &[String]) -> bool {
    row.len() >= MIN_CELLS && !row[0].trim().is_empty()
}

/// Removes surrounding whitespace and thousands separators.
#[must_use]
pub fn clean_cell(cell: &str) -> String {
    cell.trim().replace(',', "")
}

/// Coerces a single price row into a bar.
///
/// # Errors
///
/// Returns [`ParseError::MalformedRow`] if the row does not have exactly
/// [`ROW_CELLS`] cells or any cell fails to parse.
pub fn parse_row(row: &[String]) -> Result<Bar, ParseError> {
    let malformed = |reason: String| ParseError::MalformedRow {
        row: row.to_vec(),
        reason,
    };

    if row.len() != ROW_CELLS {
        return Err(malformed(format!(
            "expected {ROW_CELLS} cells, found {}",
            row.len()
        )));
    }

    let date = parse_date(&row[0]).ok_or_else(|| malformed(format!("invalid date {:?}", row[0])))?;

    let mut prices = [0.0_f64; 5];
    for (slot, cell) in prices.iter_mut().zip(&row[1..6]) {
        let cleaned = clean_cell(cell);
        *slot = cleaned
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| malformed(format!("invalid price {cell:?}")))?;
    }

    let volume = clean_cell(&row[6])
        .parse::<u64>()
        .map_err(|_| malformed(format!("invalid volume {:?}", row[6])))?;

    let [open, high, low, close, adjusted_close] = prices;
    Ok(Bar::new(date, open, high, low, close, adjusted_close, volume))
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cleaned = clean_cell(cell);
    NaiveDate::parse_from_str(&cleaned, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&cleaned, TABLE_DATE_FORMAT))
        .ok()
}

/// Drops annotation rows and coerces the rest into bars.
///
/// The returned bars keep the input order.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; no partial result is
/// returned.
pub fn parse_rows(rows: &[RawRow]) -> Result<Vec<Bar>, ParseError> {
    let mut bars = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        if !is_price_row(row) {
            skipped += 1;
            continue;
        }
        bars.push(parse_row(row)?);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "dropped annotation rows");
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn test_parse_row_with_separators() {
        let bar = parse_row(&row(&[
            "2024-01-05",
            " 10,000.5 ",
            "10,050.0",
            "9,990.25",
            "10,020",
            "10,019.75",
            "1,234,567",
        ]))
        .unwrap();

        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_relative_eq!(bar.open, 10_000.5);
        assert_relative_eq!(bar.high, 10_050.0);
        assert_relative_eq!(bar.low, 9_990.25);
        assert_relative_eq!(bar.close, 10_020.0);
        assert_relative_eq!(bar.adjusted_close, 10_019.75);
        assert_eq!(bar.volume, 1_234_567);
    }

    #[test]
    fn test_parse_row_table_date() {
        let bar = parse_row(&row(&["Jan 5, 2024", "1", "2", "0.5", "1.5", "1.5", "10"])).unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let rows = vec![
            row(&["", "10,000.5"]),
            row(&["Jan 5, 2024", "0.24 Dividend"]),
            row(&["2024-01-05", "1", "2", "0.5", "1.5", "1.5", "10"]),
        ];
        let bars = parse_rows(&rows).unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn test_undated_row_is_dropped() {
        let undated = row(&["", "10,000.5", "10,050.0"]);
        assert!(!is_price_row(&undated));

        let rows = vec![
            undated,
            row(&["2024-01-05", "1", "2", "0.5", "1.5", "1.5", "1,234,567"]),
        ];
        let bars = parse_rows(&rows).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 1_234_567);
    }

    #[test]
    fn test_dated_short_row_is_an_error() {
        let rows = vec![row(&["2024-01-05", "10,000.5", "10,050.0"])];
        assert!(matches!(
            parse_rows(&rows),
            Err(ParseError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_malformed_price_is_an_error() {
        let rows = vec![row(&["2024-01-05", "1", "abc", "0.5", "1.5", "1.5", "10"])];
        let err = parse_rows(&rows).unwrap_err();
        let ParseError::MalformedRow { row, reason } = err;
        assert_eq!(row[2], "abc");
        assert!(reason.contains("price"));
    }

    #[test]
    fn test_non_finite_price_is_an_error() {
        let result = parse_row(&row(&["2024-01-05", "NaN", "2", "0.5", "1.5", "1.5", "10"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_or_fractional_volume_is_an_error() {
        assert!(parse_row(&row(&["2024-01-05", "1", "2", "0.5", "1.5", "1.5", "-10"])).is_err());
        assert!(parse_row(&row(&["2024-01-05", "1", "2", "0.5", "1.5", "1.5", "1.5"])).is_err());
    }

    #[test]
    fn test_wrong_arity_is_an_error() {
        let result = parse_row(&row(&["2024-01-05", "1", "2", "0.5"]));
        assert!(matches!(result, Err(ParseError::MalformedRow { .. })));
    }

    #[test]
    fn test_invalid_date_is_an_error() {
        let result = parse_row(&row(&["soon", "1", "2", "0.5", "1.5", "1.5", "10"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  1,234,567 \n"), "1234567");
    }
}
