//! Tezstat blockstats process
//! Prints per-block delay and operation statistics for a time range, or for
//! every new head as it arrives.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use tezstat_common::fields::leaf_fields;
use tezstat_module_block_cache::BlockCacheConfig;
use tezstat_module_chain_stats::{ChainStats, ChainStatsConfig};
use tezstat_module_node_rpc::{HttpNodeRpc, NodeRpcConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "blockstats")]
#[command(about = "Tezos block delay and operation statistics")]
struct Args {
    #[arg(long, value_name = "PATH", default_values_t = vec!["blockstats.toml".to_string()])]
    config: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summaries of blocks with start <= timestamp < end, oldest first
    Range {
        /// RFC 3339 timestamp, inclusive
        #[arg(long)]
        start: DateTime<Utc>,
        /// RFC 3339 timestamp, exclusive
        #[arg(long)]
        end: DateTime<Utc>,
    },
    /// Summaries of new heads until interrupted
    Monitor,
    /// Selectable summary fields and their types
    Fields,
}

/// Extracts the `[name]` table of `config` as a standalone config.
fn section(config: &Config, name: &str) -> Result<Config> {
    let mut builder = Config::builder();
    if let Ok(table) = config.get_table(name) {
        for (key, value) in table {
            builder = builder.set_override(key, value)?;
        }
    }
    Ok(builder.build()?)
}

fn print_line<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn engine(config: &Config) -> Result<ChainStats> {
    let rpc_config = NodeRpcConfig::try_load(&section(config, "node")?)?;
    let cache_config = BlockCacheConfig::try_load(&section(config, "cache")?)?;
    let stats_config = ChainStatsConfig::try_load(&section(config, "stats")?)?;
    info!(url = %rpc_config.url, chain = %rpc_config.chain, "Using node");

    let rpc = Arc::new(HttpNodeRpc::new(&rpc_config)?);
    let cache = tezstat_module_block_cache::open(&cache_config)?;
    Ok(ChainStats::new(rpc, cache, stats_config))
}

async fn range(config: &Config, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    let stats = engine(config)?;
    let summaries = stats.get_range(start, end).await?;

    let mut out = BufWriter::new(io::stdout().lock());
    for summary in &summaries {
        print_line(&mut out, summary)?;
    }
    out.flush()?;
    Ok(())
}

async fn monitor(config: &Config) -> Result<()> {
    let stats = engine(config)?;
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping monitor");
            }
            token.cancel();
        });
    }

    let mut handle = stats.monitor(&token);
    let out = io::stdout();
    while let Some(summary) = handle.summaries.recv().await {
        let mut line = out.lock();
        print_line(&mut line, &summary)?;
        line.flush()?;
    }

    match handle.error.await {
        Ok(e) => {
            error!("Monitor stopped: {e}");
            eprintln!("{e}");
        }
        Err(_) => info!("Head feed closed"),
    }
    Ok(())
}

fn fields() -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for field in leaf_fields().context("enumerating summary fields")? {
        writeln!(out, "{}\t{}", field.path(), field.field_type)?;
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Get arguments and config
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter("info,fjall=warn")
        .with_writer(io::stderr)
        .init();

    let mut builder = Config::builder();
    for file in &args.config {
        builder = builder.add_source(File::with_name(file).required(false));
    }
    let config = builder
        .add_source(Environment::with_prefix("TEZSTAT").separator("__"))
        .build()
        .context("loading configuration")?;

    match args.command {
        Command::Range { start, end } => range(&config, start, end).await,
        Command::Monitor => monitor(&config).await,
        Command::Fields => fields(),
    }
}
