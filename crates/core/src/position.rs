//! Position data structures and risk ratio math.

use alloy::primitives::U256;
use smallvec::SmallVec;

/// One valued asset within a position, immutable once converted.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetAmount {
    /// Display symbol (or the `Unknown` placeholder).
    pub symbol: String,
    /// Raw on-chain integer (shares for collateral, units for loans).
    pub raw_value: U256,
    /// Decimal token quantity after fixed-point conversion.
    pub amount: f64,
    /// USD unit price, zero when the price was unavailable.
    pub unit_price_usd: f64,
    /// `amount * unit_price_usd`, always non-negative.
    pub usd_value: f64,
}

impl AssetAmount {
    pub fn new(symbol: impl Into<String>, raw_value: U256, amount: f64, unit_price_usd: f64) -> Self {
        Self {
            symbol: symbol.into(),
            raw_value,
            amount,
            unit_price_usd,
            usd_value: amount * unit_price_usd,
        }
    }
}

/// An aggregated, valued lending position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub collateral_assets: SmallVec<[AssetAmount; 4]>,
    pub borrowed_assets: SmallVec<[AssetAmount; 4]>,
    pub total_collateral_usd: f64,
    pub total_borrowed_usd: f64,
    /// Loan-to-value as a percentage; zero when there is no collateral.
    pub ltv_percent: f64,
    /// Safety margin before liquidation; infinite when debt is zero.
    pub health_factor: f64,
    pub liquidation_threshold_percent: f64,
    pub protocol: String,
    pub wallet_label: String,
}

impl PositionRecord {
    /// Eligible for liquidation under the configured threshold.
    pub fn is_liquidatable(&self) -> bool {
        self.health_factor < 1.0
    }

    /// Comma-separated collateral symbols for display.
    pub fn collateral_symbols(&self) -> String {
        symbols_of(&self.collateral_assets)
    }

    /// Comma-separated borrowed symbols for display.
    pub fn borrowed_symbols(&self) -> String {
        symbols_of(&self.borrowed_assets)
    }
}

fn symbols_of(assets: &[AssetAmount]) -> String {
    if assets.is_empty() {
        return "—".to_string();
    }
    assets
        .iter()
        .map(|a| a.symbol.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Loan-to-value as a percentage.
///
/// Zero collateral yields zero LTV: an empty position is not "infinitely
/// leveraged", the divide-by-zero case is deliberate.
pub fn calc_ltv(total_collateral_usd: f64, total_borrowed_usd: f64) -> f64 {
    if total_collateral_usd <= 0.0 {
        return 0.0;
    }
    100.0 * total_borrowed_usd / total_collateral_usd
}

/// Health factor: `(collateral * threshold% ) / borrowed`.
///
/// Zero debt yields `+inf`; a value below 1.0 means the position is
/// eligible for liquidation.
pub fn calc_health_factor(
    total_collateral_usd: f64,
    total_borrowed_usd: f64,
    liquidation_threshold_percent: f64,
) -> f64 {
    if total_borrowed_usd <= 0.0 {
        return f64::INFINITY;
    }
    (total_collateral_usd * liquidation_threshold_percent / 100.0) / total_borrowed_usd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ltv_zero_collateral() {
        assert_eq!(calc_ltv(0.0, 5000.0), 0.0);
    }

    #[test]
    fn test_ltv_basic() {
        assert!((calc_ltv(10_000.0, 5_000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_factor_zero_debt() {
        assert_eq!(calc_health_factor(10_000.0, 0.0, 85.0), f64::INFINITY);
        assert_eq!(calc_health_factor(0.0, 0.0, 85.0), f64::INFINITY);
    }

    #[test]
    fn test_health_factor_at_liquidation_boundary() {
        // Exactly at the liquidation point: HF = 1.0
        let hf = calc_health_factor(10_000.0, 8_500.0, 85.0);
        assert!((hf - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_factor_safe_position() {
        // (10000 * 0.85) / 5000 = 1.7
        let hf = calc_health_factor(10_000.0, 5_000.0, 85.0);
        assert!((hf - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_asset_amount_usd_value() {
        let asset = AssetAmount::new("SUI", U256::from(500_000_000_000u64), 500.0, 3.50);
        assert!((asset.usd_value - 1750.0).abs() < 1e-9);
    }

    #[test]
    fn test_symbol_lists() {
        let record = PositionRecord {
            collateral_assets: smallvec::smallvec![
                AssetAmount::new("SUI", U256::ZERO, 0.0, 0.0),
                AssetAmount::new("XBTC", U256::ZERO, 0.0, 0.0),
            ],
            borrowed_assets: SmallVec::new(),
            total_collateral_usd: 0.0,
            total_borrowed_usd: 0.0,
            ltv_percent: 0.0,
            health_factor: f64::INFINITY,
            liquidation_threshold_percent: 85.0,
            protocol: "alphalend".to_string(),
            wallet_label: "main".to_string(),
        };
        assert_eq!(record.collateral_symbols(), "SUI, XBTC");
        assert_eq!(record.borrowed_symbols(), "—");
        assert!(!record.is_liquidatable());
    }
}
