//! Report and alert text assembly.
//!
//! Pure string building: the notification collaborator decides where
//! the text goes. Wallet sections keep input order, and a monitored
//! wallet×protocol pair with no positions is reported explicitly so an
//! empty wallet is distinguishable from an unmonitored one.

use chrono::Utc;

use crate::classify::{AlertThresholds, AlertTier};
use crate::position::PositionRecord;

/// Positions for one protocol under a wallet (possibly none).
#[derive(Debug, Clone)]
pub struct ProtocolPositions {
    pub protocol: String,
    pub positions: Vec<PositionRecord>,
}

/// All monitored protocols for one wallet.
#[derive(Debug, Clone)]
pub struct WalletSection {
    pub wallet_label: String,
    pub chain: String,
    pub protocols: Vec<ProtocolPositions>,
}

/// Current UTC timestamp in report format.
pub fn now_str() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Shorten a wallet address for display: `0x1234567890...abcdef`.
pub fn shorten_address(address: &str) -> String {
    if address.len() > 16 {
        format!("{}...{}", &address[..10], &address[address.len() - 6..])
    } else {
        address.to_string()
    }
}

fn format_usd(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::new();
    let digits: Vec<char> = integer.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    format!("{grouped}.{fraction}")
}

fn format_hf(health_factor: f64) -> String {
    if health_factor.is_infinite() {
        "∞".to_string()
    } else {
        format!("{health_factor:.2}")
    }
}

/// Combined summary across wallets and protocols, grouped wallet →
/// protocol in input order, sections joined with a visual separator.
pub fn summarize(sections: &[WalletSection], thresholds: &AlertThresholds) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for section in sections {
        let mut lines: Vec<String> = Vec::new();

        for proto in &section.protocols {
            if proto.positions.is_empty() {
                lines.push(format!("{} · No active positions found.", proto.protocol));
                continue;
            }
            for position in &proto.positions {
                let status = thresholds.classify(position.ltv_percent).status_label();
                lines.push(format!(
                    "{} · {}\n  Collateral: ${}\n  Borrowed: ${}\n  LTV: {:.2}% · HF: {}",
                    proto.protocol,
                    status,
                    format_usd(position.total_collateral_usd),
                    format_usd(position.total_borrowed_usd),
                    position.ltv_percent,
                    format_hf(position.health_factor),
                ));
            }
        }

        let header = format!(
            "━━ {} ({}) ━━",
            section.wallet_label,
            section.chain.to_uppercase()
        );
        blocks.push(format!("{header}\n\n{}", lines.join("\n\n")));
    }

    let body = if blocks.is_empty() {
        "No active positions found.".to_string()
    } else {
        blocks.join("\n\n")
    };

    format!("📋 Daily DeFi Position Report\n\n{body}\n\n{} UTC", now_str())
}

/// Per-position log message sent on every check cycle.
pub fn build_position_log(
    position: &PositionRecord,
    chain: &str,
    thresholds: &AlertThresholds,
) -> String {
    let status = thresholds.classify(position.ltv_percent).status_label();
    format!(
        "📊 {} · {} · {}\n\n{}\n\nCollateral: {} — ${}\nBorrowed: {} — ${}\nLTV: {:.2}% · HF: {}\n\n{} UTC",
        position.wallet_label,
        position.protocol,
        chain.to_uppercase(),
        status,
        position.collateral_symbols(),
        format_usd(position.total_collateral_usd),
        position.borrowed_symbols(),
        format_usd(position.total_borrowed_usd),
        position.ltv_percent,
        format_hf(position.health_factor),
        now_str(),
    )
}

/// Message for a monitored wallet×protocol pair with no positions.
pub fn build_no_positions_message(wallet_label: &str, protocol: &str, chain: &str) -> String {
    format!(
        "📊 {} · {} · {}\n\nNo active positions found.\n\n{} UTC",
        wallet_label,
        protocol,
        chain.to_uppercase(),
        now_str(),
    )
}

/// Alert body for a warning or critical position.
///
/// Healthy positions have no alert; callers should not ask for one.
pub fn build_alert(
    position: &PositionRecord,
    wallet_address: &str,
    chain: &str,
    tier: AlertTier,
) -> String {
    let (headline, advice) = match tier {
        AlertTier::Critical => (
            format!("🚨 CRITICAL — LTV {:.2}%", position.ltv_percent),
            "⚠️ Add collateral or repay debt immediately!",
        ),
        _ => (
            format!("⚠️ WARNING — LTV {:.2}%", position.ltv_percent),
            "Consider adding collateral or reducing borrowed amount.",
        ),
    };

    format!(
        "{headline}\n\n{} · {} · {}\n\nCollateral: {}\n  ${}\n\nBorrowed: {}\n  ${}\n\nHealth Factor: {}\nLiquidation Threshold: {:.2}%\n\n{advice}\n\nWallet: {}\n{} UTC",
        position.wallet_label,
        position.protocol,
        chain.to_uppercase(),
        position.collateral_symbols(),
        format_usd(position.total_collateral_usd),
        position.borrowed_symbols(),
        format_usd(position.total_borrowed_usd),
        format_hf(position.health_factor),
        position.liquidation_threshold_percent,
        shorten_address(wallet_address),
        now_str(),
    )
}

/// Notification subject line for an alert tier.
pub fn alert_subject(tier: AlertTier) -> &'static str {
    match tier {
        AlertTier::Critical => "🚨 CRITICAL: Liquidation Risk!",
        _ => "⚠️ WARNING: High LTV",
    }
}
