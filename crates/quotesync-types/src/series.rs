//! Date-ordered bar series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::Bar;

/// A sequence of bars, strictly ascending and unique by date.
///
/// Both invariants are established on construction: bars are keyed by date
/// and the first occurrence of a date wins over any later one.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Builds a series from bars in any order, keeping the first bar seen
    /// for each date.
    #[must_use]
    pub fn from_bars(bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
        for bar in bars {
            by_date.entry(bar.date).or_insert(bar);
        }
        Self {
            bars: by_date.into_values().collect(),
        }
    }

    /// Merges incoming bars into this series.
    ///
    /// Existing bars win over incoming bars with the same date.
    #[must_use]
    pub fn merge(&self, incoming: impl IntoIterator<Item = Bar>) -> Self {
        Self::from_bars(self.bars.iter().copied().chain(incoming))
    }

    /// Returns the bars in ascending date order.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Consumes the series and returns its bars.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    /// Returns the number of bars.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if the series holds no bars.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the earliest date.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    /// Returns the latest date.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }

    /// Looks up the bar for a date.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&date, |bar| bar.date)
            .ok()
            .map(|idx| &self.bars[idx])
    }

    /// Returns an iterator over the dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|bar| bar.date)
    }

    /// Returns an iterator over the bars.
    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

impl FromIterator<Bar> for Series {
    fn from_iter<I: IntoIterator<Item = Bar>>(iter: I) -> Self {
        Self::from_bars(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(date(day), close, close, close, close, close, 100)
    }

    #[test]
    fn test_from_bars_sorts_ascending() {
        let series = Series::from_bars([bar(4, 4.0), bar(2, 2.0), bar(3, 3.0)]);
        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![date(2), date(3), date(4)]);
    }

    #[test]
    fn test_from_bars_keeps_first_duplicate() {
        let series = Series::from_bars([bar(2, 1.0), bar(2, 9.0)]);
        assert_eq!(series.len(), 1);
        assert_relative_eq!(series.bars()[0].close, 1.0);
    }

    #[test]
    fn test_merge_existing_wins_on_overlap() {
        let existing = Series::from_bars([bar(2, 2.0), bar(3, 3.0)]);
        let merged = existing.merge([bar(3, 30.0), bar(4, 40.0)]);

        assert_eq!(merged.len(), 3);
        assert_relative_eq!(merged.get(date(3)).unwrap().close, 3.0);
        assert_relative_eq!(merged.get(date(4)).unwrap().close, 40.0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = Series::from_bars([bar(2, 2.0), bar(3, 3.0)]);
        let incoming = [bar(3, 30.0), bar(4, 40.0)];

        let once = existing.merge(incoming);
        let twice = once.merge(incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_never_loses_dates() {
        let existing = Series::from_bars([bar(2, 2.0), bar(5, 5.0)]);
        let merged = existing.merge([bar(3, 3.0)]);
        assert!(existing.dates().all(|d| merged.get(d).is_some()));
    }

    #[test]
    fn test_first_and_last_date() {
        let series = Series::from_bars([bar(3, 3.0), bar(2, 2.0)]);
        assert_eq!(series.first_date(), Some(date(2)));
        assert_eq!(series.last_date(), Some(date(3)));
        assert_eq!(Series::new().last_date(), None);
    }

    #[test]
    fn test_get_missing_date() {
        let series = Series::from_bars([bar(2, 2.0)]);
        assert!(series.get(date(3)).is_none());
    }
}
