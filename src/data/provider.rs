use std::collections::HashMap;
use std::sync::mpsc::Sender;

use anyhow::{Context, Result, bail};

use crate::Cli;
use crate::config::{BASE_INTERVAL_MS, DEMO_CANDLE_COUNT, DF};
use crate::data::{CandleStorage, SqliteStore};
use crate::domain::{Candle, OhlcvSeries};
use crate::utils::{TimeUtils, now_timestamp_ms};

const BINANCE_KLINES_URL: &str = "https://api.binance.com/api/v3/klines";
const FETCH_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Pending,
    Completed(usize),
    Failed(String),
}

/// Per-symbol loading progress reported back to the bootstrap screen.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub index: usize,
    pub symbol: String,
    pub status: SyncStatus,
}

/// Load candle history for every watched symbol: SQLite cache first, the
/// exchange REST API for whatever the cache is missing (or everything with
/// `--prefer-api`), and a deterministic offline demo series when both come
/// up empty.
pub async fn fetch_symbol_data(
    symbols: &[String],
    args: &Cli,
    store: &SqliteStore,
    progress: Option<Sender<ProgressEvent>>,
) -> HashMap<String, OhlcvSeries> {
    let interval_str = TimeUtils::interval_to_string(BASE_INTERVAL_MS);
    let mut out = HashMap::new();

    for (index, symbol) in symbols.iter().enumerate() {
        report(&progress, index, symbol, SyncStatus::Pending);

        let series = load_one_symbol(symbol, interval_str, args, store).await;
        match series {
            Ok(series) => {
                report(&progress, index, symbol, SyncStatus::Completed(series.len()));
                out.insert(symbol.clone(), series);
            }
            Err(err) => {
                log::error!("Failed to load {symbol}: {err:#}");
                report(&progress, index, symbol, SyncStatus::Failed(err.to_string()));
            }
        }
    }

    out
}

async fn load_one_symbol(
    symbol: &str,
    interval_str: &'static str,
    args: &Cli,
    store: &SqliteStore,
) -> Result<OhlcvSeries> {
    let mut cached = store.load_candles(symbol, interval_str).await?;

    let needs_fetch = args.prefer_api || cached.is_empty();
    if needs_fetch {
        let start_time = store.last_candle_time(symbol, interval_str).await?;
        match fetch_klines(symbol, interval_str, start_time).await {
            Ok(fresh) => {
                if DF.log_provider {
                    log::info!("Fetched {} candles for {symbol}", fresh.len());
                }
                store.insert_candles(symbol, interval_str, &fresh).await?;
                cached = store.load_candles(symbol, interval_str).await?;
            }
            Err(err) if cached.is_empty() => {
                // Offline with an empty cache: fall back to a synthetic
                // series so the chart and overlay remain usable.
                log::warn!("API unavailable for {symbol} ({err}); using demo data");
                cached = demo_series(symbol);
            }
            Err(err) => {
                log::warn!("API refresh failed for {symbol}; serving cache: {err}");
            }
        }
    }

    if cached.is_empty() {
        bail!("no candles available for {symbol}");
    }

    Ok(OhlcvSeries::new(
        symbol.to_string(),
        BASE_INTERVAL_MS,
        cached,
    ))
}

/// One page of Binance klines. Rows arrive as JSON arrays:
/// `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`.
async fn fetch_klines(
    symbol: &str,
    interval_str: &str,
    start_time: Option<i64>,
) -> Result<Vec<Candle>> {
    let mut url = format!(
        "{}?symbol={}&interval={}&limit={}",
        BINANCE_KLINES_URL, symbol, interval_str, FETCH_LIMIT
    );
    if let Some(start) = start_time {
        url.push_str(&format!("&startTime={}", start));
    }

    let rows: Vec<Vec<serde_json::Value>> = reqwest::get(&url)
        .await
        .context("klines request failed")?
        .error_for_status()
        .context("klines request rejected")?
        .json()
        .await
        .context("klines response was not valid JSON")?;

    rows.iter().map(parse_kline_row).collect()
}

fn parse_kline_row(row: &Vec<serde_json::Value>) -> Result<Candle> {
    if row.len() < 6 {
        bail!("kline row too short: {} fields", row.len());
    }
    let num = |v: &serde_json::Value| -> Result<f64> {
        v.as_str()
            .context("expected numeric string")?
            .parse::<f64>()
            .context("unparseable numeric string")
    };
    Ok(Candle::new(
        row[0].as_i64().context("missing open_time")?,
        num(&row[1])?,
        num(&row[2])?,
        num(&row[3])?,
        num(&row[4])?,
        num(&row[5])?,
    ))
}

/// Deterministic synthetic walk so the app works without network or cache.
/// Seeded from the symbol name: the same symbol always generates the same
/// chart.
fn demo_series(symbol: &str) -> Vec<Candle> {
    let seed: u64 = symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |acc, b| {
        (acc ^ b as u64).wrapping_mul(0x100_0000_01b3)
    });
    let base_price = 100.0 + (seed % 900) as f64;
    let now = now_timestamp_ms();
    let start = now - BASE_INTERVAL_MS * DEMO_CANDLE_COUNT as i64;

    let mut price = base_price;
    let mut state = seed;
    let mut next = move || {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 1_000) as f64 / 1_000.0
    };

    (0..DEMO_CANDLE_COUNT)
        .map(|i| {
            let t = start + i as i64 * BASE_INTERVAL_MS;
            let drift = (i as f64 / 40.0).sin() * base_price * 0.01;
            let noise = (next() - 0.5) * base_price * 0.02;
            let open = price;
            let close = (open + drift + noise).max(base_price * 0.2);
            let high = open.max(close) * (1.0 + next() * 0.005);
            let low = open.min(close) * (1.0 - next() * 0.005);
            let volume = 50.0 + next() * 200.0;
            price = close;
            Candle::new(t, open, high, low, close, volume)
        })
        .collect()
}

fn report(
    progress: &Option<Sender<ProgressEvent>>,
    index: usize,
    symbol: &str,
    status: SyncStatus,
) {
    if let Some(tx) = progress {
        let _ = tx.send(ProgressEvent {
            index,
            symbol: symbol.to_string(),
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_series_is_deterministic_per_symbol() {
        let a = demo_series("BTCUSDT");
        let b = demo_series("BTCUSDT");
        let c = demo_series("ETHUSDT");
        assert_eq!(a.len(), DEMO_CANDLE_COUNT);
        assert_eq!(a[10].close_price, b[10].close_price);
        assert_ne!(a[10].close_price, c[10].close_price);
    }

    #[test]
    fn demo_candles_are_internally_consistent() {
        for c in demo_series("SOLUSDT") {
            assert!(c.high_price >= c.open_price.max(c.close_price));
            assert!(c.low_price <= c.open_price.min(c.close_price));
            assert!(c.volume > 0.0);
        }
    }

    #[test]
    fn kline_rows_parse_and_reject_short_rows() {
        let row: Vec<serde_json::Value> = serde_json::from_str(
            r#"[1700000000000, "100.5", "101.0", "99.5", "100.8", "1234.5", 1700003599999]"#,
        )
        .unwrap();
        let candle = parse_kline_row(&row).unwrap();
        assert_eq!(candle.timestamp_ms, 1_700_000_000_000);
        assert_eq!(candle.close_price, 100.8);

        let short: Vec<serde_json::Value> = serde_json::from_str(r#"[1, "2"]"#).unwrap();
        assert!(parse_kline_row(&short).is_err());
    }
}
