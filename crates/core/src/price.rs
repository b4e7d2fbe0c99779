//! Price resolution with alias fallback.
//!
//! A price of exactly zero is treated the same as a missing entry: no
//! asset in this domain legitimately trades at zero, so zero means the
//! feed did not deliver. The result type keeps "unavailable" visible
//! instead of silently collapsing it into `0.0`.

use std::collections::HashMap;

use crate::token::AliasTable;

/// Symbol to USD unit price, pre-fetched by the oracle collaborator.
pub type PriceTable = HashMap<String, f64>;

/// Outcome of a price lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedPrice {
    /// A usable non-zero unit price.
    Available(f64),
    /// No price for the symbol or its alias; values as zero USD.
    Unavailable,
}

impl ResolvedPrice {
    /// Unit price for USD math; unavailable resolves to zero.
    pub fn usd(&self) -> f64 {
        match self {
            Self::Available(price) => *price,
            Self::Unavailable => 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Resolve the USD unit price for a symbol.
///
/// Looks up the symbol directly; on a miss (or a zero price) retries
/// via the configured alias; a final miss is [`ResolvedPrice::Unavailable`].
pub fn resolve(symbol: &str, prices: &PriceTable, aliases: &AliasTable) -> ResolvedPrice {
    if let Some(&price) = prices.get(symbol) {
        if price != 0.0 {
            return ResolvedPrice::Available(price);
        }
    }

    if let Some(alias) = aliases.get(symbol) {
        if let Some(&price) = prices.get(alias) {
            if price != 0.0 {
                return ResolvedPrice::Available(price);
            }
        }
    }

    ResolvedPrice::Unavailable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(pairs: &[(&str, f64)]) -> PriceTable {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn aliases(pairs: &[(&str, &str)]) -> AliasTable {
        pairs
            .iter()
            .map(|(s, a)| (s.to_string(), a.to_string()))
            .collect()
    }

    #[test]
    fn test_direct_lookup() {
        let table = prices(&[("SUI", 3.50)]);
        assert_eq!(
            resolve("SUI", &table, &AliasTable::new()),
            ResolvedPrice::Available(3.50)
        );
    }

    #[test]
    fn test_alias_fallback() {
        let table = prices(&[("BTC", 100_000.0)]);
        let alias = aliases(&[("XBTC", "BTC")]);
        let resolved = resolve("XBTC", &table, &alias);
        assert_eq!(resolved, ResolvedPrice::Available(100_000.0));
        assert_eq!(resolved.usd(), 100_000.0);
    }

    #[test]
    fn test_zero_price_triggers_alias() {
        // Zero is treated as missing for fallback purposes
        let table = prices(&[("XBTC", 0.0), ("BTC", 100_000.0)]);
        let alias = aliases(&[("XBTC", "BTC")]);
        assert_eq!(
            resolve("XBTC", &table, &alias),
            ResolvedPrice::Available(100_000.0)
        );
    }

    #[test]
    fn test_missing_everywhere() {
        let resolved = resolve("DOGE", &PriceTable::new(), &AliasTable::new());
        assert_eq!(resolved, ResolvedPrice::Unavailable);
        assert_eq!(resolved.usd(), 0.0);
        assert!(!resolved.is_available());
    }

    #[test]
    fn test_alias_also_zero() {
        let table = prices(&[("XBTC", 0.0), ("BTC", 0.0)]);
        let alias = aliases(&[("XBTC", "BTC")]);
        assert_eq!(resolve("XBTC", &table, &alias), ResolvedPrice::Unavailable);
    }
}
