//! Monitor configuration.
//!
//! Explicit structs loaded from a TOML file and passed by reference
//! into the components that need them; no process-global state.
//! Validation runs once at load and fails fast before any cycle.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::AlertThresholds;
use crate::token::{AliasTable, DecimalsTable};
use crate::valuator::ValuationConfig;

/// Configuration failures are hard, startup-time errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("ltv_warning ({warning}) must not exceed ltv_critical ({critical})")]
    ThresholdOrder { warning: f64, critical: f64 },

    #[error("wallet '{wallet}' references unconfigured protocol '{protocol}'")]
    UnknownProtocol { wallet: String, protocol: String },

    #[error("protocol '{protocol}' references unconfigured chain '{chain}'")]
    UnknownChain { protocol: String, chain: String },

    #[error("chain '{chain}' has no RPC endpoints")]
    NoRpcEndpoints { chain: String },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,

    #[serde(default)]
    pub wallets: Vec<WalletConfig>,

    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,

    #[serde(default)]
    pub protocols: HashMap<String, ProtocolConfig>,

    #[serde(default)]
    pub price_oracle: OracleConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation: threshold ordering and wallet/protocol/
    /// chain references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = &self.monitor.thresholds;
        if thresholds.ltv_warning > thresholds.ltv_critical {
            return Err(ConfigError::ThresholdOrder {
                warning: thresholds.ltv_warning,
                critical: thresholds.ltv_critical,
            });
        }

        for wallet in &self.wallets {
            for protocol in &wallet.protocols {
                if !self.protocols.contains_key(protocol) {
                    return Err(ConfigError::UnknownProtocol {
                        wallet: wallet.label.clone(),
                        protocol: protocol.clone(),
                    });
                }
            }
        }

        for (name, protocol) in &self.protocols {
            if !self.chains.contains_key(&protocol.chain) {
                return Err(ConfigError::UnknownChain {
                    protocol: name.clone(),
                    chain: protocol.chain.clone(),
                });
            }
        }

        for (name, chain) in &self.chains {
            if chain.rpc_endpoints.is_empty() {
                return Err(ConfigError::NoRpcEndpoints { chain: name.clone() });
            }
        }

        Ok(())
    }

    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            warning: self.monitor.thresholds.ltv_warning,
            critical: self.monitor.thresholds.ltv_critical,
        }
    }
}

/// Monitoring cadence and alert thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u64,

    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

fn default_check_interval() -> u64 {
    15
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval_minutes: default_check_interval(),
            thresholds: ThresholdsConfig::default(),
        }
    }
}

impl MonitorSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }
}

/// LTV alert thresholds (percent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default = "default_ltv_warning")]
    pub ltv_warning: f64,

    #[serde(default = "default_ltv_critical")]
    pub ltv_critical: f64,
}

fn default_ltv_warning() -> f64 {
    70.0
}
fn default_ltv_critical() -> f64 {
    80.0
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            ltv_warning: default_ltv_warning(),
            ltv_critical: default_ltv_critical(),
        }
    }
}

/// A monitored wallet and the protocols checked for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub label: String,
    pub chain: String,
    pub address: String,
    #[serde(default)]
    pub protocols: Vec<String>,
}

/// Chain RPC settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rpc_endpoints: Vec<String>,

    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_secs: u64,
}

fn default_rpc_timeout() -> u64 {
    10
}

impl ChainConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

/// Per-protocol settings: contract objects plus valuation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub chain: String,

    #[serde(default)]
    pub contracts: ProtocolContracts,

    #[serde(default = "default_liquidation_threshold")]
    pub liquidation_threshold: f64,

    #[serde(default)]
    pub token_decimals: DecimalsTable,

    #[serde(default)]
    pub token_aliases: AliasTable,
}

fn default_liquidation_threshold() -> f64 {
    85.0
}

impl ProtocolConfig {
    /// Borrow the valuation parameters for the core.
    pub fn valuation(&self) -> ValuationConfig<'_> {
        ValuationConfig {
            decimals: &self.token_decimals,
            aliases: &self.token_aliases,
            liquidation_threshold_percent: self.liquidation_threshold,
        }
    }
}

/// On-chain object ids of a lending protocol deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolContracts {
    #[serde(default)]
    pub lending_protocol_id: String,
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub positions_table_id: String,
    #[serde(default)]
    pub markets_table_id: String,
}

/// Price oracle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_provider")]
    pub provider: String,

    #[serde(default)]
    pub pyth: PythSettings,
}

fn default_oracle_provider() -> String {
    "pyth".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_oracle_provider(),
            pyth: PythSettings::default(),
        }
    }
}

/// Pyth Hermes endpoint and the symbol → feed id table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PythSettings {
    #[serde(default = "default_hermes_url")]
    pub hermes_url: String,

    #[serde(default)]
    pub feeds: HashMap<String, String>,
}

fn default_hermes_url() -> String {
    "https://hermes.pyth.network/v2/updates/price/latest".to_string()
}

impl Default for PythSettings {
    fn default() -> Self {
        Self {
            hermes_url: default_hermes_url(),
            feeds: HashMap::new(),
        }
    }
}

/// Notification channel settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub telegram: TelegramSettings,
}

/// Telegram bot credentials: separate bots for alerts and logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub alert_bot_token: String,
    #[serde(default)]
    pub log_bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOML: &str = r#"
        [monitor]
        check_interval_minutes = 5

        [monitor.thresholds]
        ltv_warning = 70.0
        ltv_critical = 80.0

        [[wallets]]
        label = "main"
        chain = "sui"
        address = "0xWALLET"
        protocols = ["alphalend"]

        [chains.sui]
        rpc_endpoints = ["https://rpc.example.com"]
        rpc_timeout_secs = 10

        [protocols.alphalend]
        chain = "sui"
        liquidation_threshold = 85.0

        [protocols.alphalend.contracts]
        package_id = "0xdef"
        positions_table_id = "0x111"
        markets_table_id = "0x222"

        [protocols.alphalend.token_decimals]
        SUI = 9
        USDC = 6

        [protocols.alphalend.token_aliases]
        XBTC = "BTC"

        [price_oracle.pyth.feeds]
        SUI = "aaa"
        BTC = "bbb"

        [notifications.telegram]
        enabled = true
        alert_bot_token = "tok1"
        log_bot_token = "tok2"
        chat_id = "999"
    "#;

    fn sample_config() -> AppConfig {
        toml::from_str(SAMPLE_TOML).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let config = sample_config();
        config.validate().unwrap();

        assert_eq!(config.monitor.check_interval_minutes, 5);
        assert_eq!(config.wallets.len(), 1);
        assert_eq!(config.wallets[0].protocols, vec!["alphalend"]);

        let protocol = &config.protocols["alphalend"];
        assert_eq!(protocol.token_decimals["USDC"], 6);
        assert_eq!(protocol.token_aliases["XBTC"], "BTC");
        assert_eq!(protocol.valuation().liquidation_threshold_percent, 85.0);

        assert_eq!(config.thresholds().warning, 70.0);
        assert!(config.notifications.telegram.enabled);
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.monitor.check_interval_minutes, 15);
        assert_eq!(config.monitor.thresholds.ltv_warning, 70.0);
        assert_eq!(config.monitor.thresholds.ltv_critical, 80.0);
        assert!(config.price_oracle.pyth.hermes_url.contains("hermes.pyth.network"));
    }

    #[test]
    fn test_threshold_order_validation() {
        let mut config = sample_config();
        config.monitor.thresholds.ltv_warning = 90.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_unknown_protocol_validation() {
        let mut config = sample_config();
        config.wallets[0].protocols.push("navi".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownProtocol { .. })
        ));
    }

    #[test]
    fn test_unknown_chain_validation() {
        let mut config = sample_config();
        config.protocols.get_mut("alphalend").unwrap().chain = "aptos".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownChain { .. })
        ));
    }

    #[test]
    fn test_empty_rpc_validation() {
        let mut config = sample_config();
        config.chains.get_mut("sui").unwrap().rpc_endpoints.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoRpcEndpoints { .. })
        ));
    }

    #[test]
    fn test_round_trip_serialization() {
        let config = sample_config();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(
            parsed.monitor.check_interval_minutes,
            config.monitor.check_interval_minutes
        );
    }
}
