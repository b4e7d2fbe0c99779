//! Pyth Network price client (Hermes HTTP endpoint).

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use lendwatch_core::{PriceTable, PythSettings};

/// Cycle-level oracle failures; the driver logs and retries next cycle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("price feed returned HTTP {status}")]
    Status { status: u16 },
}

/// Hermes response shapes (only the fields the monitor reads).
#[derive(Debug, Deserialize)]
struct HermesResponse {
    #[serde(default)]
    parsed: Vec<ParsedFeed>,
}

#[derive(Debug, Deserialize)]
struct ParsedFeed {
    id: String,
    price: FeedPrice,
}

#[derive(Debug, Deserialize)]
struct FeedPrice {
    /// Raw integer price as a decimal string.
    price: String,
    /// Power-of-ten exponent, typically negative.
    expo: i32,
}

/// Pyth price oracle client.
#[derive(Debug, Clone)]
pub struct PythClient {
    client: reqwest::Client,
    hermes_url: String,
    feeds: HashMap<String, String>,
}

impl PythClient {
    pub fn new(settings: &PythSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            hermes_url: settings.hermes_url.clone(),
            feeds: settings.feeds.clone(),
        }
    }

    /// Fetch current USD prices for the configured feeds.
    ///
    /// With `symbols`, only the matching feeds are queried. Symbols
    /// sharing a feed id (price aliases) each receive the price.
    pub async fn fetch_prices(&self, symbols: Option<&[String]>) -> Result<PriceTable, OracleError> {
        let feeds = selected_feeds(&self.feeds, symbols);
        if feeds.is_empty() {
            return Ok(PriceTable::new());
        }

        let mut feed_ids: Vec<&String> = feeds.values().collect();
        feed_ids.sort();
        feed_ids.dedup();

        let query: Vec<(&str, &str)> = feed_ids
            .iter()
            .map(|id| ("ids[]", id.as_str()))
            .collect();

        let response = self
            .client
            .get(&self.hermes_url)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
            });
        }

        let data: HermesResponse = response.json().await?;
        let prices = prices_from_parsed(&feeds, &data.parsed);

        info!(count = prices.len(), "fetched prices from Pyth");
        for (symbol, price) in &prices {
            debug!(symbol = %symbol, price = price, "price");
        }

        Ok(prices)
    }
}

fn selected_feeds(
    feeds: &HashMap<String, String>,
    symbols: Option<&[String]>,
) -> HashMap<String, String> {
    match symbols {
        Some(wanted) => feeds
            .iter()
            .filter(|(symbol, _)| wanted.contains(symbol))
            .map(|(s, f)| (s.clone(), f.clone()))
            .collect(),
        None => feeds.clone(),
    }
}

fn prices_from_parsed(feeds: &HashMap<String, String>, parsed: &[ParsedFeed]) -> PriceTable {
    // Reverse mapping: one feed id may price several symbols.
    let mut id_to_symbols: HashMap<&str, Vec<&str>> = HashMap::new();
    for (symbol, feed_id) in feeds {
        id_to_symbols
            .entry(feed_id.as_str())
            .or_default()
            .push(symbol.as_str());
    }

    let mut prices = PriceTable::new();
    for feed in parsed {
        let Ok(raw) = feed.price.price.parse::<i64>() else {
            continue;
        };
        let price = scale_price(raw, feed.price.expo);
        if let Some(symbols) = id_to_symbols.get(feed.id.as_str()) {
            for symbol in symbols {
                prices.insert(symbol.to_string(), price);
            }
        }
    }
    prices
}

/// `raw * 10^expo` — Pyth publishes fixed-point prices.
fn scale_price(raw: i64, expo: i32) -> f64 {
    raw as f64 * 10f64.powi(expo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_table() -> HashMap<String, String> {
        [
            ("BTC".to_string(), "feed-btc".to_string()),
            ("XBTC".to_string(), "feed-btc".to_string()),
            ("SUI".to_string(), "feed-sui".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_scale_price() {
        // 100000.0 published as 10000000000000 with expo -8
        assert!((scale_price(10_000_000_000_000, -8) - 100_000.0).abs() < 1e-6);
        assert!((scale_price(350_000_000, -8) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_selected_feeds_filter() {
        let feeds = feed_table();
        let wanted = vec!["SUI".to_string()];
        let selected = selected_feeds(&feeds, Some(&wanted));
        assert_eq!(selected.len(), 1);
        assert!(selected.contains_key("SUI"));

        assert_eq!(selected_feeds(&feeds, None).len(), 3);
    }

    #[test]
    fn test_aliased_symbols_share_feed_price() {
        let feeds = feed_table();
        let parsed: HermesResponse = serde_json::from_str(
            r#"{
                "parsed": [
                    {"id": "feed-btc", "price": {"price": "10000000000000", "expo": -8}},
                    {"id": "feed-sui", "price": {"price": "350000000", "expo": -8}}
                ]
            }"#,
        )
        .unwrap();

        let prices = prices_from_parsed(&feeds, &parsed.parsed);
        assert!((prices["BTC"] - 100_000.0).abs() < 1e-6);
        assert!((prices["XBTC"] - 100_000.0).abs() < 1e-6);
        assert!((prices["SUI"] - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_price_skipped() {
        let feeds = feed_table();
        let parsed = vec![ParsedFeed {
            id: "feed-btc".to_string(),
            price: FeedPrice {
                price: "not-a-number".to_string(),
                expo: -8,
            },
        }];
        assert!(prices_from_parsed(&feeds, &parsed).is_empty());
    }
}
