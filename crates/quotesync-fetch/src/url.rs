//! Chart endpoint URL construction.

use quotesync_types::{FetchWindow, Symbol};

/// Default base URL for the Yahoo Finance chart API.
pub const BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Builds the URL used to probe whether a symbol exists.
///
/// # Example
///
/// ```
/// use quotesync_fetch::url::profile_url;
/// use quotesync_types::Symbol;
///
/// let symbol = Symbol::new("aapl").unwrap();
/// assert_eq!(
///     profile_url("https://query2.finance.yahoo.com", &symbol),
///     "https://query2.finance.yahoo.com/v8/finance/chart/AAPL?range=1d&interval=1d"
/// );
/// ```
#[must_use]
pub fn profile_url(base: &str, symbol: &Symbol) -> String {
    format!(
        "{}/v8/finance/chart/{}?range=1d&interval=1d",
        base.trim_end_matches('/'),
        encode_symbol(symbol)
    )
}

/// Builds the URL for daily history within a window.
///
/// `period1` and `period2` are the window bounds in Unix seconds. Dividend
/// and split events are requested so they arrive as annotation rows.
#[must_use]
pub fn history_url(base: &str, symbol: &Symbol, window: FetchWindow) -> String {
    format!(
        "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit&includeAdjustedClose=true",
        base.trim_end_matches('/'),
        encode_symbol(symbol),
        window.start_timestamp(),
        window.end_timestamp()
    )
}

fn encode_symbol(symbol: &Symbol) -> String {
    urlencoding::encode(&symbol.as_str().to_uppercase()).into_owned()
}
