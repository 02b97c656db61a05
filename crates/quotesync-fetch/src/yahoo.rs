//! Yahoo Finance chart endpoint as a [`RemoteSource`].
//!
//! Responses are flattened into the same text rows the quote history table
//! carries: seven cells per priced day, and two-cell annotation rows for
//! dividends, splits and days the endpoint reports without values.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use quotesync_types::{DATE_FORMAT, FetchWindow, Symbol};
use serde::Deserialize;

use crate::url::{BASE_URL, history_url, profile_url};
use crate::{ClientConfig, HttpClient, Probe, RawRow, RemoteSource, SourceError};

/// Configuration for [`YahooSource`].
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL of the chart API.
    pub base_url: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
    events: Option<Events>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    /// Exchange offset from UTC in seconds.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Events {
    dividends: HashMap<String, DividendEvent>,
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitEvent {
    date: i64,
    split_ratio: Option<String>,
}

/// Remote source backed by the Yahoo Finance chart API.
#[derive(Debug, Clone)]
pub struct YahooSource {
    client: HttpClient,
    config: YahooConfig,
}

impl YahooSource {
    /// Creates a source using the given HTTP client.
    #[must_use]
    pub const fn new(client: HttpClient, config: YahooConfig) -> Self {
        Self { client, config }
    }

    /// Creates a source with default client and endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpClient::new(ClientConfig::default())?,
            YahooConfig::default(),
        ))
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub const fn config(&self) -> &YahooConfig {
        &self.config
    }
}

#[async_trait]
impl RemoteSource for YahooSource {
    async fn validate_symbol(&self, symbol: &Symbol) -> Result<Probe, SourceError> {
        let url = profile_url(&self.config.base_url, symbol);
        tracing::debug!(%symbol, %url, "probing symbol");

        match self.client.get_text(&url).await? {
            Some(body) => probe_from_chart(&body),
            None => Ok(Probe::NotFound),
        }
    }

    async fn fetch_range(
        &self,
        symbol: &Symbol,
        window: FetchWindow,
    ) -> Result<Vec<RawRow>, SourceError> {
        let url = history_url(&self.config.base_url, symbol, window);
        tracing::debug!(%symbol, %window, %url, "fetching history");

        let body = self
            .client
            .get_text(&url)
            .await?
            .ok_or(SourceError::ServerError { status: 404 })?;
        rows_from_chart(&body)
    }
}

fn decode(body: &str) -> Result<ChartBody, SourceError> {
    serde_json::from_str::<ChartResponse>(body)
        .map(|response| response.chart)
        .map_err(|e| SourceError::Decode(e.to_string()))
}

fn first_result(chart: ChartBody) -> Result<Option<ChartData>, SourceError> {
    if let Some(data) = chart.result.and_then(|results| results.into_iter().next()) {
        return Ok(Some(data));
    }
    match chart.error {
        Some(err) if err.code == "Not Found" => Ok(None),
        Some(err) => Err(SourceError::Decode(format!(
            "{}: {}",
            err.code, err.description
        ))),
        None => Err(SourceError::Decode("empty result with no error".into())),
    }
}

/// Interprets a chart response as a symbol probe.
fn probe_from_chart(body: &str) -> Result<Probe, SourceError> {
    let Some(data) = first_result(decode(body)?)? else {
        return Ok(Probe::NotFound);
    };

    let meta = data.meta;
    let about = meta
        .long_name
        .or(meta.short_name)
        .or(meta.symbol)
        .unwrap_or_default();
    Ok(Probe::Found { about })
}

/// Flattens a chart response into raw text rows.
fn rows_from_chart(body: &str) -> Result<Vec<RawRow>, SourceError> {
    let Some(data) = first_result(decode(body)?)? else {
        return Ok(Vec::new());
    };

    let offset = data.meta.gmtoffset.unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let (quote, adjclose) = match data.indicators {
        Some(indicators) => (
            indicators.quote.into_iter().next().unwrap_or_default(),
            indicators
                .adjclose
                .and_then(|v| v.into_iter().next())
                .map(|a| a.adjclose),
        ),
        None => (QuoteData::default(), None),
    };

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = format_date(ts, offset)?;
        let value = |series: &[Option<f64>]| series.get(i).copied().flatten();

        let close = value(&quote.close);
        let adjusted = adjclose.as_deref().map_or(close, value);
        let cells = (
            value(&quote.open),
            value(&quote.high),
            value(&quote.low),
            close,
            adjusted,
            quote.volume.get(i).copied().flatten(),
        );

        match cells {
            (Some(open), Some(high), Some(low), Some(close), Some(adj), Some(volume)) => {
                rows.push(vec![
                    date,
                    open.to_string(),
                    high.to_string(),
                    low.to_string(),
                    close.to_string(),
                    adj.to_string(),
                    volume.to_string(),
                ]);
            }
            _ => rows.push(vec![date, "-".to_string()]),
        }
    }

    let events = data.events.unwrap_or_default();
    for dividend in events.dividends.into_values() {
        rows.push(vec![
            format_date(dividend.date, offset)?,
            format!("{} Dividend", dividend.amount),
        ]);
    }
    for split in events.splits.into_values() {
        rows.push(vec![
            format_date(split.date, offset)?,
            format!("{} Stock Splits", split.split_ratio.unwrap_or_default()),
        ]);
    }

    Ok(rows)
}

/// Formats a UTC timestamp as the exchange-local calendar date.
fn format_date(ts: i64, offset: i64) -> Result<String, SourceError> {
    DateTime::from_timestamp(ts.saturating_add(offset), 0)
        .map(|dt| dt.date_naive().format(DATE_FORMAT).to_string())
        .ok_or_else(|| SourceError::Decode(format!("invalid timestamp: {ts}")))
}
