//! Typed decoding of raw on-chain position records.
//!
//! Sui RPC returns Move values as nested `{"fields": {...}}` wrappers
//! with integers encoded as decimal strings. This module replaces the
//! permissive traversal of the original prototypes with explicit wire
//! structs and a tagged [`ParseOutcome`], so a partially-decodable
//! position is distinguishable from a clean or an absent one.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::fixpoint::RATIO_SCALE;

/// Placeholder coin type when market metadata could not be resolved.
pub const UNKNOWN_COIN_TYPE: &str = "Unknown";

/// One collateral entry: xtoken shares keyed by market id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCollateralEntry {
    pub market_id: u64,
    pub shares: U256,
}

/// One loan entry: raw token units with the coin type embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLoanEntry {
    pub amount: U256,
    pub coin_type: String,
}

/// A decoded position record, pre-valuation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPosition {
    pub collaterals: Vec<RawCollateralEntry>,
    pub loans: Vec<RawLoanEntry>,
    /// Protocol-reported health flag (informational only).
    pub is_healthy: bool,
    /// Protocol-reported liquidatable flag (informational only).
    pub is_liquidatable: bool,
}

/// Market metadata: coin type plus the 18-decimal xtoken exchange ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMarket {
    pub coin_type: String,
    pub exchange_ratio: U256,
}

impl Default for RawMarket {
    fn default() -> Self {
        Self {
            coin_type: UNKNOWN_COIN_TYPE.to_string(),
            exchange_ratio: RATIO_SCALE,
        }
    }
}

/// Decode result that keeps partial failure visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    /// Every entry decoded.
    Complete(T),
    /// Some entries were dropped; the count says how many.
    Partial(T, usize),
    /// No decodable record at all (absent, null, or unrecognized shape).
    Empty,
}

impl<T> ParseOutcome<T> {
    pub fn into_inner(self) -> Option<T> {
        match self {
            Self::Complete(value) | Self::Partial(value, _) => Some(value),
            Self::Empty => None,
        }
    }

    pub fn dropped_entries(&self) -> usize {
        match self {
            Self::Partial(_, dropped) => *dropped,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

// Wire-shape structs. Field wrappers stay private; callers only see the
// flat Raw* types above.

#[derive(Debug, Deserialize)]
struct EntryWire<T> {
    fields: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CollateralFieldsWire {
    #[serde(default, deserialize_with = "u64_from_any")]
    key: u64,
    #[serde(default, deserialize_with = "u256_from_any")]
    value: U256,
}

#[derive(Debug, Deserialize)]
struct LoanFieldsWire {
    #[serde(default, deserialize_with = "u256_from_any")]
    amount: U256,
    #[serde(default)]
    coin_type: Option<CoinTypeWire>,
}

#[derive(Debug, Deserialize)]
struct CoinTypeWire {
    #[serde(default)]
    fields: Option<NamedWire>,
}

#[derive(Debug, Deserialize)]
struct NamedWire {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct MarketWire {
    #[serde(default)]
    coin_type: Option<CoinTypeWire>,
    #[serde(default)]
    xtoken_ratio: Option<Value>,
}

fn coin_type_name(wire: Option<CoinTypeWire>) -> String {
    wire.and_then(|c| c.fields)
        .map(|n| n.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_COIN_TYPE.to_string())
}

/// Decode a single collateral entry; `None` when the wrapper shape is
/// unrecognizable.
pub fn decode_collateral_entry(value: &Value) -> Option<RawCollateralEntry> {
    let wire: EntryWire<CollateralFieldsWire> = serde_json::from_value(value.clone()).ok()?;
    let fields = wire.fields?;
    Some(RawCollateralEntry {
        market_id: fields.key,
        shares: fields.value,
    })
}

/// Decode a single loan entry; `None` when the wrapper shape is
/// unrecognizable.
pub fn decode_loan_entry(value: &Value) -> Option<RawLoanEntry> {
    let wire: EntryWire<LoanFieldsWire> = serde_json::from_value(value.clone()).ok()?;
    let fields = wire.fields?;
    Some(RawLoanEntry {
        amount: fields.amount,
        coin_type: coin_type_name(fields.coin_type),
    })
}

/// Decode a position table value into a [`RawPosition`].
///
/// An absent/null value, or an object carrying neither collaterals nor
/// loans, is [`ParseOutcome::Empty`]. Entries that fail to decode are
/// dropped and counted rather than aborting the whole position.
pub fn decode_position(value: &Value) -> ParseOutcome<RawPosition> {
    let object = match value.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return ParseOutcome::Empty,
    };
    if !object.contains_key("collaterals") && !object.contains_key("loans") {
        return ParseOutcome::Empty;
    }

    let mut dropped = 0usize;

    let mut collaterals = Vec::new();
    if let Some(entries) = value
        .pointer("/collaterals/fields/contents")
        .and_then(Value::as_array)
    {
        for entry in entries {
            match decode_collateral_entry(entry) {
                Some(decoded) => collaterals.push(decoded),
                None => dropped += 1,
            }
        }
    }

    let mut loans = Vec::new();
    if let Some(entries) = value.get("loans").and_then(Value::as_array) {
        for entry in entries {
            match decode_loan_entry(entry) {
                Some(decoded) => loans.push(decoded),
                None => dropped += 1,
            }
        }
    }

    let position = RawPosition {
        collaterals,
        loans,
        is_healthy: value
            .get("is_position_healthy")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        is_liquidatable: value
            .get("is_position_liquidatable")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };

    if dropped == 0 {
        ParseOutcome::Complete(position)
    } else {
        ParseOutcome::Partial(position, dropped)
    }
}

/// Decode market metadata; `None` when the lookup came back empty.
///
/// The xtoken ratio appears on the wire either as a bare integer
/// string or wrapped in a field struct; absence means a 1:1 ratio.
pub fn decode_market(value: &Value) -> Option<RawMarket> {
    let object = value.as_object()?;
    if object.is_empty() {
        return None;
    }

    let wire: MarketWire = serde_json::from_value(value.clone()).ok()?;
    Some(RawMarket {
        coin_type: coin_type_name(wire.coin_type),
        exchange_ratio: wire
            .xtoken_ratio
            .as_ref()
            .and_then(ratio_from_value)
            .unwrap_or(RATIO_SCALE),
    })
}

fn ratio_from_value(value: &Value) -> Option<U256> {
    match value {
        Value::String(_) | Value::Number(_) => parse_u256(value),
        Value::Object(_) => value.pointer("/fields/value").and_then(parse_u256),
        _ => None,
    }
}

fn parse_u256(value: &Value) -> Option<U256> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    }
}

// Custom deserializers for string-or-number integers.

fn u256_from_any<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_u256(&value)
        .ok_or_else(|| serde::de::Error::custom("expected integer or decimal string"))
}

fn u64_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom("expected integer string")),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("expected unsigned integer")),
        _ => Err(serde::de::Error::custom("expected integer or string")),
    }
}
