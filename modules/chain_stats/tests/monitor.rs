mod common;

use common::{stats, MockNode, MINIMAL_DELAY};
use tezstat_module_chain_stats::{ChainStatsConfig, MonitorError};
use tezstat_module_node_rpc::RpcError;
use tezstat_test_utils::shell_header;
use tokio_util::sync::CancellationToken;

fn truncated() -> RpcError {
    RpcError::Truncated {
        endpoint: "monitor_heads",
    }
}

#[tokio::test]
async fn summarises_each_new_head() {
    let node = MockNode::new(10);
    let feed = node.feed(8);
    let (stats, _) = stats(&node, ChainStatsConfig::default());
    let token = CancellationToken::new();
    let mut handle = stats.monitor(&token);

    for level in [5, 6] {
        feed.headers.send(shell_header(node.chain.at_level(level))).await.unwrap();
        let summary = handle.summaries.recv().await.unwrap();
        assert_eq!(summary.info.header.level, level);
        assert_eq!(summary.delay, 60);
        assert_eq!(summary.minimal_delay, MINIMAL_DELAY);
    }
    // Level 5 was already resolved as the predecessor of 6
    assert_eq!(node.block_fetches(), 3);

    drop(feed);
    assert!(handle.summaries.recv().await.is_none());
    assert!(handle.error.await.is_err(), "clean end reports no error");
}

#[tokio::test]
async fn cancellation_closes_output() {
    let node = MockNode::new(10);
    let feed = node.feed(8);
    let (stats, _) = stats(&node, ChainStatsConfig::default());
    let token = CancellationToken::new();
    let mut handle = stats.monitor(&token);

    feed.headers.send(shell_header(node.chain.at_level(3))).await.unwrap();
    assert!(handle.summaries.recv().await.is_some());

    token.cancel();
    assert!(matches!(handle.error.await.unwrap(), MonitorError::Cancelled));
    assert!(handle.summaries.recv().await.is_none());
}

#[tokio::test]
async fn feed_error_wins_over_cancellation() {
    let node = MockNode::new(10);
    let feed = node.feed(8);
    let (stats, _) = stats(&node, ChainStatsConfig::default());
    let token = CancellationToken::new();
    let mut handle = stats.monitor(&token);

    feed.headers.send(shell_header(node.chain.at_level(3))).await.unwrap();
    assert!(handle.summaries.recv().await.is_some());

    feed.errors.send(truncated()).unwrap();
    token.cancel();
    let err = handle.error.await.unwrap();
    assert!(matches!(err, MonitorError::Feed(RpcError::Truncated { .. })), "{err}");
    drop(feed.headers);
}

#[tokio::test]
async fn feed_failure_is_reported() {
    let node = MockNode::new(10);
    let feed = node.feed(8);
    let (stats, _) = stats(&node, ChainStatsConfig::default());
    let mut handle = stats.monitor(&CancellationToken::new());

    feed.errors.send(truncated()).unwrap();
    drop(feed.headers);
    assert!(handle.summaries.recv().await.is_none());
    assert!(matches!(handle.error.await.unwrap(), MonitorError::Feed(_)));
}

#[tokio::test]
async fn failed_subscription_is_reported() {
    let node = MockNode::new(10);
    let (stats, _) = stats(&node, ChainStatsConfig::default());
    let mut handle = stats.monitor(&CancellationToken::new());

    assert!(handle.summaries.recv().await.is_none());
    assert!(matches!(handle.error.await.unwrap(), MonitorError::Feed(_)));
}

#[tokio::test]
async fn processing_failure_stops_the_monitor() {
    let node = MockNode::new(10);
    node.fail_block(&node.chain.at_level(4).hash);
    let feed = node.feed(8);
    let (stats, _) = stats(&node, ChainStatsConfig::default());
    let mut handle = stats.monitor(&CancellationToken::new());

    feed.headers.send(shell_header(node.chain.at_level(4))).await.unwrap();
    assert!(handle.summaries.recv().await.is_none());
    assert!(matches!(handle.error.await.unwrap(), MonitorError::Processing(_)));
}

#[tokio::test]
async fn stalled_consumer_saturates() {
    let node = MockNode::new(10);
    let feed = node.feed(8);
    let config = ChainStatsConfig {
        summary_buffer: 1,
        send_timeout_ms: 50,
    };
    let (stats, _) = stats(&node, config);
    let handle = stats.monitor(&CancellationToken::new());

    for level in 5..8 {
        feed.headers.send(shell_header(node.chain.at_level(level))).await.unwrap();
    }
    assert!(matches!(handle.error.await.unwrap(), MonitorError::Saturated));
    drop(handle.summaries);
}
