/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed watcher configuration and subscription list
[POS]:    Configuration layer - watcher setup
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, bail};
use hydro_sdk::{ChannelName, WatcherConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the watcher binary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchConfig {
    /// Stream endpoint; the exchange default when absent
    #[serde(default)]
    pub ws_url: Option<String>,
    /// Pause between reconnect attempts in milliseconds
    #[serde(default)]
    pub reconnect_delay_ms: u64,
    /// Bound on commands queued while disconnected
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Channels to subscribe to on startup
    pub subscriptions: Vec<SubscriptionConfig>,
}

/// One channel and the markets it covers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionConfig {
    pub channel: ChannelName,
    pub market_ids: Vec<String>,
}

impl WatchConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {path}"))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.subscriptions.is_empty() {
            bail!("config must list at least one subscription");
        }
        for subscription in &self.subscriptions {
            if subscription.market_ids.is_empty() {
                bail!(
                    "subscription to {} channel lists no market ids",
                    subscription.channel
                );
            }
        }
        if self.queue_capacity == Some(0) {
            bail!("queue_capacity must be greater than zero");
        }
        Ok(())
    }

    pub fn watcher_config(&self) -> WatcherConfig {
        let mut config = WatcherConfig::default()
            .with_reconnect_delay(Duration::from_millis(self.reconnect_delay_ms));
        if let Some(url) = &self.ws_url {
            config = config.with_url(url.clone());
        }
        if let Some(capacity) = self.queue_capacity {
            config = config.with_queue_capacity(capacity);
        }
        config
    }
}
