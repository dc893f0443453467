use anyhow::Result;
use config::Config;
use serde::Deserialize;

/// Node RPC settings (from TOML).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeRpcConfig {
    pub url: String,
    #[serde(default = "defaults::chain")]
    pub chain: String,
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Capacity of the head feed channel.
    #[serde(default = "defaults::heads_buffer")]
    pub heads_buffer: usize,
}

impl NodeRpcConfig {
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

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            chain: defaults::chain(),
            timeout_secs: defaults::timeout(),
            connect_timeout_secs: defaults::connect_timeout(),
            heads_buffer: defaults::heads_buffer(),
        }
    }
}

mod defaults {
    pub fn chain() -> String {
        "main".to_string()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn connect_timeout() -> u64 {
        10
    }
    pub fn heads_buffer() -> usize {
        100
    }
}
