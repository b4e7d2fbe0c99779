//! Monitoring orchestrator.
//!
//! Drives one check cycle at a time: fetch prices once, walk every
//! configured wallet × protocol pair, log positions, and dispatch
//! alerts for positions past the LTV thresholds.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{error, info, warn};

use lendwatch_api::{Notifier, PythClient, TelegramNotifier};
use lendwatch_chain::{AlphaLendAdapter, ProtocolAdapter, SuiRpcClient};
use lendwatch_core::{
    alert_subject, build_alert, build_no_positions_message, build_position_log, summarize,
    AlertThresholds, AppConfig, ProtocolPositions, WalletSection,
};

/// Pause before resuming after a failed cycle.
const ERROR_RESUME_DELAY: Duration = Duration::from_secs(60);

pub struct Monitor {
    config: AppConfig,
    adapters: HashMap<String, Arc<dyn ProtocolAdapter>>,
    oracle: PythClient,
    notifier: Arc<dyn Notifier>,
    thresholds: AlertThresholds,
}

impl Monitor {
    /// Build RPC clients, protocol adapters, the price oracle and the
    /// notification channel from a validated configuration.
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut clients: HashMap<String, Arc<SuiRpcClient>> = HashMap::new();
        for (name, chain) in &config.chains {
            let client = SuiRpcClient::new(chain.rpc_endpoints.clone(), chain.rpc_timeout())
                .with_context(|| format!("building RPC client for chain {name}"))?;
            clients.insert(name.clone(), Arc::new(client));
        }

        let mut adapters: HashMap<String, Arc<dyn ProtocolAdapter>> = HashMap::new();
        for (name, protocol) in &config.protocols {
            // Validation guarantees the chain exists.
            let client = clients
                .get(&protocol.chain)
                .cloned()
                .with_context(|| format!("no RPC client for chain {}", protocol.chain))?;
            adapters.insert(
                name.clone(),
                Arc::new(AlphaLendAdapter::new(client, protocol.clone())),
            );
        }

        let oracle = PythClient::new(&config.price_oracle.pyth);
        let notifier: Arc<dyn Notifier> =
            Arc::new(TelegramNotifier::new(config.notifications.telegram.clone()));
        let thresholds = config.thresholds();

        info!(
            chains = clients.len(),
            protocols = adapters.len(),
            wallets = config.wallets.len(),
            "monitor initialized"
        );

        Ok(Self {
            config,
            adapters,
            oracle,
            notifier,
            thresholds,
        })
    }

    /// One full check cycle with per-position logs and threshold
    /// alerts.
    pub async fn check_and_alert(&self) -> Result<()> {
        let prices = self
            .oracle
            .fetch_prices(None)
            .await
            .context("fetching prices")?;

        for wallet in &self.config.wallets {
            for protocol_name in &wallet.protocols {
                let Some(adapter) = self.adapters.get(protocol_name) else {
                    continue;
                };

                let positions = match adapter
                    .fetch_positions(&wallet.address, &wallet.label, &prices)
                    .await
                {
                    Ok(positions) => positions,
                    Err(err) => {
                        // Still emit the no-positions line so the pair
                        // stays visible; the failure itself is logged.
                        warn!(
                            wallet = %wallet.label,
                            protocol = %protocol_name,
                            error = %err,
                            "position fetch failed"
                        );
                        Vec::new()
                    }
                };

                if positions.is_empty() {
                    let message = build_no_positions_message(
                        &wallet.label,
                        adapter.protocol_name(),
                        &wallet.chain,
                    );
                    self.notifier.send_log(&message, true).await;
                    continue;
                }

                let logs: Vec<String> = positions
                    .iter()
                    .map(|p| build_position_log(p, &wallet.chain, &self.thresholds))
                    .collect();
                join_all(logs.iter().map(|m| self.notifier.send_log(m, true))).await;

                for position in &positions {
                    let tier = self.thresholds.classify(position.ltv_percent);
                    if !tier.is_alert() {
                        continue;
                    }
                    let alert = build_alert(position, &wallet.address, &wallet.chain, tier);
                    let delivered = self.notifier.send_alert(&alert, alert_subject(tier)).await;
                    info!(
                        wallet = %wallet.label,
                        protocol = %protocol_name,
                        ltv = position.ltv_percent,
                        tier = ?tier,
                        delivered,
                        "alert dispatched"
                    );
                }
            }
        }

        Ok(())
    }

    /// Aggregate every wallet × protocol pair into one daily summary
    /// and send it on the log channel with sound.
    pub async fn daily_report(&self) -> Result<()> {
        let prices = self
            .oracle
            .fetch_prices(None)
            .await
            .context("fetching prices")?;

        let mut sections = Vec::with_capacity(self.config.wallets.len());
        for wallet in &self.config.wallets {
            let mut protocols = Vec::with_capacity(wallet.protocols.len());
            for protocol_name in &wallet.protocols {
                let Some(adapter) = self.adapters.get(protocol_name) else {
                    continue;
                };
                let positions = match adapter
                    .fetch_positions(&wallet.address, &wallet.label, &prices)
                    .await
                {
                    Ok(positions) => positions,
                    Err(err) => {
                        warn!(
                            wallet = %wallet.label,
                            protocol = %protocol_name,
                            error = %err,
                            "position fetch failed, reporting pair as empty"
                        );
                        Vec::new()
                    }
                };
                protocols.push(ProtocolPositions {
                    protocol: adapter.protocol_name().to_string(),
                    positions,
                });
            }
            sections.push(WalletSection {
                wallet_label: wallet.label.clone(),
                chain: wallet.chain.clone(),
                protocols,
            });
        }

        let report = summarize(&sections, &self.thresholds);
        let delivered = self.notifier.send_log(&report, false).await;
        info!(delivered, "daily report sent");

        Ok(())
    }

    /// Continuous monitoring loop. A failed cycle is logged and
    /// retried after a short pause; the loop never terminates on a
    /// collaborator failure.
    pub async fn run_continuous(&self, interval_minutes: Option<u64>) -> Result<()> {
        let interval = interval_minutes
            .map(|m| Duration::from_secs(m * 60))
            .unwrap_or_else(|| self.config.monitor.check_interval());

        info!(interval_secs = interval.as_secs(), "starting continuous monitoring");

        loop {
            if let Err(err) = self.check_and_alert().await {
                error!(error = %err, "check cycle failed, resuming shortly");
                tokio::time::sleep(ERROR_RESUME_DELAY).await;
                continue;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
