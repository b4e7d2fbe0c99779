//! DeFi lending position monitor.
//!
//! Watches configured wallets on Sui lending protocols, values their
//! positions against Pyth prices, and sends Telegram logs and alerts.
//! Subcommands:
//! - `check`: one cycle with alerts
//! - `report`: one aggregated daily summary
//! - `monitor [minutes]`: continuous loop (default, config interval)

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lendwatch_core::AppConfig;

mod monitor;

use monitor::Monitor;

/// Environment variable names.
mod env {
    pub const CONFIG_PATH: &str = "LENDWATCH_CONFIG";
    pub const ALERT_BOT_TOKEN: &str = "TELEGRAM_ALERT_BOT_TOKEN";
    pub const LOG_BOT_TOKEN: &str = "TELEGRAM_LOG_BOT_TOKEN";
    pub const CHAT_ID: &str = "TELEGRAM_CHAT_ID";
}

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,lendwatch_core=debug,lendwatch_chain=debug")
        }))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("monitor");

    let config_path =
        std::env::var(env::CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = AppConfig::from_file(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;
    apply_env_overrides(&mut config);

    info!(
        wallets = config.wallets.len(),
        protocols = config.protocols.len(),
        "configuration loaded"
    );

    let monitor = Monitor::new(config)?;

    match command {
        "check" => monitor.check_and_alert().await?,
        "report" => monitor.daily_report().await?,
        "monitor" => {
            let minutes = args
                .get(2)
                .map(|m| m.parse::<u64>())
                .transpose()
                .context("interval must be a whole number of minutes")?;
            monitor.run_continuous(minutes).await?;
        }
        other => anyhow::bail!("unknown command: {other} (expected check, report, or monitor)"),
    }

    Ok(())
}

/// Credentials come from the environment so the config file can be
/// committed without secrets.
fn apply_env_overrides(config: &mut AppConfig) {
    let telegram = &mut config.notifications.telegram;
    if let Ok(token) = std::env::var(env::ALERT_BOT_TOKEN) {
        telegram.alert_bot_token = token;
    }
    if let Ok(token) = std::env::var(env::LOG_BOT_TOKEN) {
        telegram.log_bot_token = token;
    }
    if let Ok(chat_id) = std::env::var(env::CHAT_ID) {
        telegram.chat_id = chat_id;
    }
}
