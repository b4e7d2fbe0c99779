//! Position valuation: raw entries plus market/price data in, a
//! [`PositionRecord`] out.
//!
//! All inputs are pre-fetched by the collaborators; nothing here blocks
//! or performs I/O. Entries whose market metadata is missing degrade to
//! a zero-valued `Unknown` asset instead of failing the position.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::decode::{RawCollateralEntry, RawLoanEntry, RawMarket, RawPosition, UNKNOWN_COIN_TYPE};
use crate::fixpoint;
use crate::position::{calc_health_factor, calc_ltv, AssetAmount, PositionRecord};
use crate::price::{self, PriceTable};
use crate::token::{self, AliasTable, DecimalsTable};

/// Market metadata keyed by integer market id, pre-fetched (and cached)
/// by the chain collaborator.
pub type MarketTable = HashMap<u64, RawMarket>;

/// Per-protocol valuation parameters, borrowed from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ValuationConfig<'a> {
    pub decimals: &'a DecimalsTable,
    pub aliases: &'a AliasTable,
    pub liquidation_threshold_percent: f64,
}

/// Value a single collateral entry (share rule).
pub fn value_collateral(
    entry: &RawCollateralEntry,
    markets: &MarketTable,
    prices: &PriceTable,
    config: &ValuationConfig<'_>,
) -> AssetAmount {
    let Some(market) = markets.get(&entry.market_id) else {
        warn!(
            market_id = entry.market_id,
            "no market metadata, valuing collateral as Unknown"
        );
        return AssetAmount::new(UNKNOWN_COIN_TYPE, entry.shares, 0.0, 0.0);
    };

    let symbol = if market.coin_type == UNKNOWN_COIN_TYPE {
        UNKNOWN_COIN_TYPE.to_string()
    } else {
        token::symbol_from_coin_type(&market.coin_type)
    };
    let decimals = token::decimals_for(&symbol, config.decimals);
    let amount = fixpoint::shares_to_amount(entry.shares, market.exchange_ratio, decimals);
    let resolved = price::resolve(&symbol, prices, config.aliases);
    if !resolved.is_available() {
        warn!(symbol = %symbol, "price unavailable for collateral, valuing at zero");
    }

    AssetAmount::new(symbol, entry.shares, amount, resolved.usd())
}

/// Value a single loan entry (direct-amount rule).
pub fn value_loan(
    entry: &RawLoanEntry,
    prices: &PriceTable,
    config: &ValuationConfig<'_>,
) -> AssetAmount {
    let symbol = if entry.coin_type == UNKNOWN_COIN_TYPE {
        UNKNOWN_COIN_TYPE.to_string()
    } else {
        token::symbol_from_coin_type(&entry.coin_type)
    };
    let decimals = token::decimals_for(&symbol, config.decimals);
    let amount = fixpoint::raw_to_amount(entry.amount, decimals);
    let resolved = price::resolve(&symbol, prices, config.aliases);
    if !resolved.is_available() {
        warn!(symbol = %symbol, "price unavailable for loan, valuing at zero");
    }

    AssetAmount::new(symbol, entry.amount, amount, resolved.usd())
}

/// Aggregate a decoded position into a valued [`PositionRecord`].
pub fn value_position(
    position: &RawPosition,
    markets: &MarketTable,
    prices: &PriceTable,
    config: &ValuationConfig<'_>,
    protocol: &str,
    wallet_label: &str,
) -> PositionRecord {
    let collateral_assets: SmallVec<[AssetAmount; 4]> = position
        .collaterals
        .iter()
        .map(|entry| value_collateral(entry, markets, prices, config))
        .collect();

    let borrowed_assets: SmallVec<[AssetAmount; 4]> = position
        .loans
        .iter()
        .map(|entry| value_loan(entry, prices, config))
        .collect();

    let total_collateral_usd: f64 = collateral_assets.iter().map(|a| a.usd_value).sum();
    let total_borrowed_usd: f64 = borrowed_assets.iter().map(|a| a.usd_value).sum();

    let ltv_percent = calc_ltv(total_collateral_usd, total_borrowed_usd);
    let health_factor = calc_health_factor(
        total_collateral_usd,
        total_borrowed_usd,
        config.liquidation_threshold_percent,
    );

    debug!(
        protocol = protocol,
        wallet = wallet_label,
        collateral_usd = total_collateral_usd,
        borrowed_usd = total_borrowed_usd,
        ltv = ltv_percent,
        hf = health_factor,
        "valued position"
    );

    PositionRecord {
        collateral_assets,
        borrowed_assets,
        total_collateral_usd,
        total_borrowed_usd,
        ltv_percent,
        health_factor,
        liquidation_threshold_percent: config.liquidation_threshold_percent,
        protocol: protocol.to_string(),
        wallet_label: wallet_label.to_string(),
    }
}
