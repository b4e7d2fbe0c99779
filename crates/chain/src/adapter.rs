//! AlphaLend protocol adapter: fetches raw position data and hands it
//! to the core for valuation.
//!
//! Market metadata is effectively static, so lookups are cached for
//! the process lifetime behind a [`DashMap`]. Per-entry fetch failures
//! degrade to placeholders in the core; only a wallet-level RPC outage
//! propagates as an error.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use lendwatch_core::{
    decode_market, decode_position, value_position, MarketTable, ParseOutcome, PositionRecord,
    PriceTable, ProtocolConfig, RawCollateralEntry, RawMarket,
};

use crate::rpc::{RpcError, SuiRpcClient};

/// A lending protocol the monitor can read positions from.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    fn protocol_name(&self) -> &str;

    /// All valued positions for a wallet, using pre-fetched prices.
    async fn fetch_positions(
        &self,
        wallet_address: &str,
        wallet_label: &str,
        prices: &PriceTable,
    ) -> Result<Vec<PositionRecord>, RpcError>;
}

/// Adapter for the AlphaLend lending protocol on Sui.
pub struct AlphaLendAdapter {
    client: Arc<SuiRpcClient>,
    config: ProtocolConfig,
    /// market id → metadata, warm for the process lifetime.
    market_cache: DashMap<u64, RawMarket>,
}

impl AlphaLendAdapter {
    pub fn new(client: Arc<SuiRpcClient>, config: ProtocolConfig) -> Self {
        Self {
            client,
            config,
            market_cache: DashMap::new(),
        }
    }

    /// Find PositionCap object ids owned by the wallet.
    async fn position_capabilities(&self, wallet_address: &str) -> Result<Vec<String>, RpcError> {
        let objects = self.client.get_owned_objects(wallet_address).await?;
        let package_id = &self.config.contracts.package_id;

        Ok(objects
            .iter()
            .filter_map(|obj| {
                let obj_type = obj.pointer("/data/type").and_then(Value::as_str)?;
                if !is_position_cap(obj_type, package_id) {
                    return None;
                }
                obj.pointer("/data/objectId")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect())
    }

    /// Fetch the raw position value from the protocol's positions table.
    async fn position_value(&self, position_id: &str) -> Result<Value, RpcError> {
        let data = self
            .client
            .get_dynamic_field_object(
                &self.config.contracts.positions_table_id,
                "0x2::object::ID",
                position_id,
            )
            .await?;
        Ok(extract_table_value(&data))
    }

    /// Market metadata by id, served from the cache when warm.
    async fn market(&self, market_id: u64) -> Option<RawMarket> {
        if let Some(cached) = self.market_cache.get(&market_id) {
            return Some(cached.clone());
        }

        let data = match self
            .client
            .get_dynamic_field_object(
                &self.config.contracts.markets_table_id,
                "u64",
                &market_id.to_string(),
            )
            .await
        {
            Ok(data) => data,
            Err(err) => {
                warn!(market_id, error = %err, "market lookup failed");
                return None;
            }
        };

        let market = decode_market(&extract_table_value(&data))?;
        self.market_cache.insert(market_id, market.clone());
        Some(market)
    }

    /// Resolve metadata for every market referenced by the entries.
    async fn markets_for(&self, entries: &[RawCollateralEntry]) -> MarketTable {
        let mut markets = MarketTable::new();
        for entry in entries {
            if markets.contains_key(&entry.market_id) {
                continue;
            }
            if let Some(market) = self.market(entry.market_id).await {
                markets.insert(entry.market_id, market);
            }
        }
        markets
    }
}

#[async_trait]
impl ProtocolAdapter for AlphaLendAdapter {
    fn protocol_name(&self) -> &str {
        "alphalend"
    }

    async fn fetch_positions(
        &self,
        wallet_address: &str,
        wallet_label: &str,
        prices: &PriceTable,
    ) -> Result<Vec<PositionRecord>, RpcError> {
        info!(wallet = wallet_label, "checking AlphaLend positions");

        let caps = self.position_capabilities(wallet_address).await?;
        info!(count = caps.len(), "found position capabilities");

        let mut positions = Vec::new();

        for cap_id in &caps {
            let details = match self.client.get_object(cap_id).await {
                Ok(details) => details,
                Err(err) => {
                    warn!(cap = %cap_id, error = %err, "could not fetch PositionCap");
                    continue;
                }
            };

            let Some(position_id) = cap_position_id(&details) else {
                debug!(cap = %cap_id, "no position_id in PositionCap");
                continue;
            };

            let value = match self.position_value(&position_id).await {
                Ok(value) => value,
                Err(err) => {
                    warn!(position = %position_id, error = %err, "could not fetch position data");
                    continue;
                }
            };

            let (raw, dropped) = match decode_position(&value) {
                ParseOutcome::Empty => {
                    warn!(position = %position_id, "no decodable position data");
                    continue;
                }
                ParseOutcome::Complete(raw) => (raw, 0),
                ParseOutcome::Partial(raw, dropped) => (raw, dropped),
            };
            if dropped > 0 {
                warn!(position = %position_id, dropped, "dropped undecodable entries");
            }

            let markets = self.markets_for(&raw.collaterals).await;
            positions.push(value_position(
                &raw,
                &markets,
                prices,
                &self.config.valuation(),
                self.protocol_name(),
                wallet_label,
            ));
        }

        Ok(positions)
    }
}

/// Whether an owned object's type marks it as an AlphaLend PositionCap.
fn is_position_cap(obj_type: &str, package_id: &str) -> bool {
    let type_lower = obj_type.to_lowercase();
    type_lower.contains("positioncap")
        || type_lower.contains("position_cap")
        || (!package_id.is_empty() && obj_type.contains(package_id))
}

/// Extract the position id referenced by a PositionCap object.
fn cap_position_id(details: &Value) -> Option<String> {
    details
        .pointer("/data/content/fields/position_id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Unwrap a dynamic-field table value down to its inner fields.
fn extract_table_value(data: &Value) -> Value {
    data.pointer("/content/fields/value/fields")
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_position_cap() {
        assert!(is_position_cap("0xd631::position::PositionCap", "0xpkg"));
        assert!(is_position_cap("0xd631::position::position_cap<T>", ""));
        assert!(is_position_cap("0xpkg::lending::Obligation", "0xpkg"));
        assert!(!is_position_cap("0x2::coin::Coin<0x2::sui::SUI>", "0xpkg"));
        // empty package id must not match every type
        assert!(!is_position_cap("0x2::coin::Coin<0x2::sui::SUI>", ""));
    }

    #[test]
    fn test_cap_position_id() {
        let details = json!({
            "data": {"content": {"fields": {"position_id": "0xposition"}}}
        });
        assert_eq!(cap_position_id(&details).as_deref(), Some("0xposition"));
        assert_eq!(cap_position_id(&json!({})), None);
    }

    #[test]
    fn test_extract_table_value() {
        let data = json!({
            "content": {"fields": {"value": {"fields": {"loans": []}}}}
        });
        let value = extract_table_value(&data);
        assert!(value.get("loans").is_some());
        assert!(extract_table_value(&json!({})).is_null());
    }
}
