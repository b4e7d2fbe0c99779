//! Lendwatch core logic.
//!
//! This crate provides the pure valuation and classification core of
//! the position monitor:
//! - Token identity and decimal lookup
//! - Fixed-point conversion of raw shares/amounts to token quantities
//! - Price resolution with alias fallback
//! - Typed decoding of raw on-chain position records
//! - Position valuation (totals, LTV, health factor)
//! - Alert tier classification and report assembly
//!
//! Everything here is synchronous and I/O-free: chain data and prices
//! arrive pre-fetched from the collaborator crates.

pub mod classify;
pub mod config;
pub mod decode;
pub mod fixpoint;
pub mod position;
pub mod price;
pub mod report;
pub mod token;
pub mod valuator;

pub use classify::{AlertThresholds, AlertTier};
pub use config::{
    AppConfig, ChainConfig, ConfigError, MonitorSettings, NotificationsConfig, OracleConfig,
    ProtocolConfig, ProtocolContracts, PythSettings, TelegramSettings, ThresholdsConfig,
    WalletConfig,
};
pub use decode::{
    decode_collateral_entry, decode_loan_entry, decode_market, decode_position, ParseOutcome,
    RawCollateralEntry, RawLoanEntry, RawMarket, RawPosition, UNKNOWN_COIN_TYPE,
};
pub use position::{calc_health_factor, calc_ltv, AssetAmount, PositionRecord};
pub use price::{resolve as resolve_price, PriceTable, ResolvedPrice};
pub use report::{
    alert_subject, build_alert, build_no_positions_message, build_position_log, shorten_address,
    summarize, ProtocolPositions, WalletSection,
};
pub use token::{decimals_for, symbol_from_coin_type, AliasTable, DecimalsTable, DEFAULT_DECIMALS};
pub use valuator::{value_collateral, value_loan, value_position, MarketTable, ValuationConfig};
