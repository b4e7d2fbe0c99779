//! Token identity helpers: coin type to display symbol, decimal lookup.

use std::collections::HashMap;

/// Per-symbol decimal counts from protocol configuration.
pub type DecimalsTable = HashMap<String, u8>;

/// Symbol to price-feed alias mapping (e.g. XBTC priced as BTC).
pub type AliasTable = HashMap<String, String>;

/// Default decimal count when a token is not configured (SUI standard).
pub const DEFAULT_DECIMALS: u8 = 9;

/// Extract the display symbol from a Move coin type string.
///
/// `0x2::sui::SUI` → `SUI`, `0xabc::coin::usdc` → `USDC`. A string
/// without a module separator is upper-cased whole; empty input stays
/// empty.
pub fn symbol_from_coin_type(coin_type: &str) -> String {
    match coin_type.rsplit("::").next() {
        Some(segment) => segment.to_uppercase(),
        None => coin_type.to_uppercase(),
    }
}

/// Decimal count for a symbol, defaulting to [`DEFAULT_DECIMALS`].
pub fn decimals_for(symbol: &str, decimals: &DecimalsTable) -> u8 {
    decimals.get(symbol).copied().unwrap_or(DEFAULT_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_extraction() {
        assert_eq!(symbol_from_coin_type("0x2::sui::SUI"), "SUI");
        assert_eq!(symbol_from_coin_type("0xabc::coin::usdc"), "USDC");
        assert_eq!(symbol_from_coin_type("btc"), "BTC");
        assert_eq!(symbol_from_coin_type(""), "");
    }

    #[test]
    fn test_symbol_trailing_separator() {
        // A trailing separator yields an empty last segment
        assert_eq!(symbol_from_coin_type("0x2::sui::"), "");
    }

    #[test]
    fn test_decimals_lookup() {
        let mut table = DecimalsTable::new();
        table.insert("USDC".to_string(), 6);
        table.insert("BTC".to_string(), 8);

        assert_eq!(decimals_for("USDC", &table), 6);
        assert_eq!(decimals_for("BTC", &table), 8);
        assert_eq!(decimals_for("SUI", &table), DEFAULT_DECIMALS);
    }
}
