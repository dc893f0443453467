use anyhow::Result;
use config::Config;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainStatsConfig {
    /// Capacity of the monitor's summary channel.
    #[serde(default = "defaults::summary_buffer")]
    pub summary_buffer: usize,
    /// How long the monitor waits on a full summary channel before giving up.
    #[serde(default = "defaults::send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl ChainStatsConfig {
    pub fn try_load(config: &Config) -> Result<Self> {
        let full = Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config.default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config.clone())
            .build()?;
        Ok(full.try_deserialize()?)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for ChainStatsConfig {
    fn default() -> Self {
        Self {
            summary_buffer: defaults::summary_buffer(),
            send_timeout_ms: defaults::send_timeout_ms(),
        }
    }
}

mod defaults {
    pub fn summary_buffer() -> usize {
        100
    }
    pub fn send_timeout_ms() -> u64 {
        30_000
    }
}
