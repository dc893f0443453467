use crate::{BlockInfoResolver, ChainStats};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tezstat_common::{BlockSummary, ShellHeader};
use tezstat_module_node_rpc::{HeadStream, NodeRpc, RpcError};
use thiserror::Error;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Why a monitor stopped.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("monitor cancelled")]
    Cancelled,

    #[error("summary consumer stalled")]
    Saturated,

    #[error("head feed failed: {0}")]
    Feed(#[source] RpcError),

    #[error("processing head failed: {0:#}")]
    Processing(#[source] anyhow::Error),
}

/// Output of [`ChainStats::monitor`].
///
/// `summaries` closes when the monitor stops. An abnormal stop reports one
/// error on `error` first; a clean end of the head feed drops the sender.
pub struct MonitorHandle {
    pub summaries: mpsc::Receiver<BlockSummary>,
    pub error: oneshot::Receiver<MonitorError>,
}

impl ChainStats {
    /// Emits a summary for every new head until `token` is cancelled or the
    /// head feed ends.
    pub fn monitor(&self, token: &CancellationToken) -> MonitorHandle {
        let (summary_tx, summaries) = mpsc::channel(self.config.summary_buffer.max(1));
        let (error_tx, error) = oneshot::channel();
        let worker = Worker {
            rpc: self.rpc.clone(),
            resolver: self.resolver.clone(),
            summaries: summary_tx,
            send_timeout: self.config.send_timeout(),
            token: token.child_token(),
        };

        tokio::spawn(async move {
            match worker.run().await {
                Ok(()) => info!("Head monitor finished"),
                Err(MonitorError::Cancelled) => {
                    info!("Head monitor cancelled");
                    let _ = error_tx.send(MonitorError::Cancelled);
                }
                Err(e) => {
                    error!("Head monitor failed: {e}");
                    let _ = error_tx.send(e);
                }
            }
        });

        MonitorHandle { summaries, error }
    }
}

struct Worker {
    rpc: Arc<dyn NodeRpc>,
    resolver: Arc<BlockInfoResolver>,
    summaries: mpsc::Sender<BlockSummary>,
    send_timeout: Duration,
    token: CancellationToken,
}

impl Worker {
    async fn run(self) -> Result<(), MonitorError> {
        let mut feed = tokio::select! {
            _ = self.token.cancelled() => return Err(MonitorError::Cancelled),
            feed = self.rpc.stream_heads(self.token.clone()) => feed.map_err(feed_error)?,
        };

        loop {
            let next = tokio::select! {
                _ = self.token.cancelled() => None,
                header = feed.headers.recv() => Some(header),
            };
            let Some(header) = next else {
                return Err(cancelled(&mut feed));
            };
            let Some(header) = header else {
                // The feed reports its error before closing the headers
                return match (&mut feed.errors).await {
                    Ok(e) => Err(feed_error(e)),
                    Err(_) => Ok(()),
                };
            };

            let summary = tokio::select! {
                _ = self.token.cancelled() => return Err(cancelled(&mut feed)),
                summary = self.summarize(&header) => summary.map_err(MonitorError::Processing)?,
            };

            tokio::select! {
                _ = self.token.cancelled() => return Err(cancelled(&mut feed)),
                sent = self.summaries.send_timeout(summary, self.send_timeout) => match sent {
                    Ok(()) => {}
                    Err(SendTimeoutError::Timeout(_)) => return Err(MonitorError::Saturated),
                    Err(SendTimeoutError::Closed(_)) => {
                        warn!("Summary receiver dropped, stopping monitor");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn summarize(&self, header: &ShellHeader) -> Result<BlockSummary> {
        let info = self.resolver.resolve(&header.hash).await?;
        let predecessor = self.resolver.resolve(info.predecessor()).await?;
        info!(level = info.header.level, hash = %header.hash, "New head summarised");
        Ok(BlockSummary::new(info, &predecessor))
    }
}

/// Cancellation, unless the feed already failed on its own.
fn cancelled(feed: &mut HeadStream) -> MonitorError {
    match feed.errors.try_recv() {
        Ok(e) => feed_error(e),
        Err(_) => MonitorError::Cancelled,
    }
}

fn feed_error(e: RpcError) -> MonitorError {
    match e {
        RpcError::Cancelled => MonitorError::Cancelled,
        e => MonitorError::Feed(e),
    }
}
