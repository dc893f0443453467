use crate::{heads, BlockRef, HeadStream, NodeRpc, NodeRpcConfig, RpcError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tezstat_common::{Block, FullHeader, OperationGroups};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Node RPC over HTTP.
pub struct HttpNodeRpc {
    client: Client,
    /// Client without a total timeout, for long-lived streams.
    stream_client: Client,
    url: String,
    chain: String,
    heads_buffer: usize,
}

impl HttpNodeRpc {
    pub fn new(config: &NodeRpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(RpcError::ClientInit)?;
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(RpcError::ClientInit)?;

        Ok(Self {
            client,
            stream_client,
            url: config.url.trim_end_matches('/').to_string(),
            chain: config.chain.clone(),
            heads_buffer: config.heads_buffer.max(1),
        })
    }

    fn block_url(&self, block: &BlockRef) -> String {
        format!("{}/chains/{}/blocks/{block}", self.url, self.chain)
    }

    async fn send(
        &self,
        client: &Client,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Response, RpcError> {
        debug!(endpoint, url, "RPC request");
        let response = client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(RpcError::request(endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Http {
                endpoint,
                status,
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RpcError> {
        let response = self.send(&self.client, endpoint, url, query).await?;
        let bytes = response.bytes().await.map_err(RpcError::request(endpoint))?;
        serde_json::from_slice(&bytes).map_err(RpcError::decode(endpoint))
    }
}

#[async_trait]
impl NodeRpc for HttpNodeRpc {
    async fn get_header(&self, block: &BlockRef) -> Result<FullHeader, RpcError> {
        let url = format!("{}/header", self.block_url(block));
        self.get_json("get_header", &url, &[]).await
    }

    async fn get_block(&self, block: &BlockRef) -> Result<Block, RpcError> {
        self.get_json("get_block", &self.block_url(block), &[]).await
    }

    async fn get_operations(&self, block: &BlockRef) -> Result<OperationGroups, RpcError> {
        let url = format!("{}/operations", self.block_url(block));
        self.get_json("get_operations", &url, &[]).await
    }

    async fn get_minimal_valid_time(
        &self,
        block: &BlockRef,
        priority: u64,
        endorsing_power: u64,
    ) -> Result<DateTime<Utc>, RpcError> {
        let url = format!("{}/minimal_valid_time", self.block_url(block));
        let query = [
            ("priority", priority.to_string()),
            ("endorsing_power", endorsing_power.to_string()),
        ];
        self.get_json("get_minimal_valid_time", &url, &query).await
    }

    async fn stream_heads(&self, token: CancellationToken) -> Result<HeadStream, RpcError> {
        let url = format!("{}/monitor/heads/{}", self.url, self.chain);
        let response = tokio::select! {
            _ = token.cancelled() => return Err(RpcError::Cancelled),
            response = self.send(&self.stream_client, "monitor_heads", &url, &[]) => response?,
        };
        info!("Monitoring heads on {url}");

        let (header_tx, headers) = mpsc::channel(self.heads_buffer);
        let (error_tx, errors) = oneshot::channel();
        tokio::spawn(heads::pump(response, header_tx, error_tx, token));
        Ok(HeadStream { headers, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as TimeDelta;
    use serde_json::json;
    use tezstat_common::{Base58Hash, ShellHeader};
    use tezstat_test_utils::{block_hash, block_json, operations, shell_header, SyntheticChain};
    use test_case::test_case;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rpc(server: &MockServer) -> HttpNodeRpc {
        HttpNodeRpc::new(&NodeRpcConfig::with_url(server.uri())).unwrap()
    }

    fn chain() -> SyntheticChain {
        SyntheticChain::new(3, DateTime::<Utc>::UNIX_EPOCH, TimeDelta::minutes(1))
    }

    #[tokio::test]
    async fn fetches_block_by_hash() {
        let server = MockServer::start().await;
        let hash = block_hash(2);
        let raw = block_json(
            2,
            DateTime::<Utc>::UNIX_EPOCH,
            &hash,
            &block_hash(1),
            operations::every_variant(),
        );
        Mock::given(method("GET"))
            .and(path(format!("/chains/main/blocks/{hash}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&raw))
            .mount(&server)
            .await;

        let block = rpc(&server).get_block(&BlockRef::Hash(hash.clone())).await.unwrap();
        assert_eq!(block.hash, hash);
        assert_eq!(block.header.level, 2);
        assert_eq!(block.operations.len(), 4);
    }

    #[tokio::test]
    async fn fetches_head_header() {
        let server = MockServer::start().await;
        let block = chain().head().clone();
        Mock::given(method("GET"))
            .and(path("/chains/main/blocks/head/header"))
            .respond_with(ResponseTemplate::new(200).set_body_json(block.full_header()))
            .mount(&server)
            .await;

        let header = rpc(&server).get_header(&BlockRef::Head).await.unwrap();
        assert_eq!(header, block.full_header());
    }

    #[tokio::test]
    async fn fetches_operations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chains/main/blocks/7/operations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(operations::every_variant()))
            .mount(&server)
            .await;

        let groups = rpc(&server).get_operations(&BlockRef::Level(7)).await.unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[3][0].contents.len(), 6);
    }

    #[tokio::test]
    async fn passes_priority_and_power() {
        let server = MockServer::start().await;
        let hash = block_hash(1);
        Mock::given(method("GET"))
            .and(path(format!("/chains/main/blocks/{hash}/minimal_valid_time")))
            .and(query_param("priority", "2"))
            .and(query_param("endorsing_power", "27"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("2021-08-06T12:00:30Z")))
            .mount(&server)
            .await;

        let time = rpc(&server).get_minimal_valid_time(&BlockRef::Hash(hash), 2, 27).await.unwrap();
        assert_eq!(time.to_rfc3339(), "2021-08-06T12:00:30+00:00");
    }

    #[test_case(404 ; "not found")]
    #[test_case(500 ; "server error")]
    #[tokio::test]
    async fn non_success_carries_status_and_body(status: u16) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("no such block"))
            .mount(&server)
            .await;

        let err = rpc(&server).get_block(&BlockRef::Level(1)).await.unwrap_err();
        match err {
            RpcError::Http { status: got, body, .. } => {
                assert_eq!(got.as_u16(), status);
                assert_eq!(body, "no such block");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_fields_fail_decoding() {
        let server = MockServer::start().await;
        let mut header = serde_json::to_value(chain().head().full_header()).unwrap();
        header["payload_round"] = json!(0);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(header))
            .mount(&server)
            .await;

        let err = rpc(&server).get_header(&BlockRef::Head).await.unwrap_err();
        assert!(matches!(err, RpcError::Decode { endpoint: "get_header", .. }));
    }

    #[tokio::test]
    async fn streams_heads_then_closes() {
        let server = MockServer::start().await;
        let headers: Vec<ShellHeader> = chain().blocks.iter().map(shell_header).collect();
        let body: String = headers.iter().map(|h| serde_json::to_string(h).unwrap() + "\n").collect();
        Mock::given(method("GET"))
            .and(path("/monitor/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let mut stream = rpc(&server).stream_heads(CancellationToken::new()).await.unwrap();
        let mut got = Vec::new();
        while let Some(h) = stream.headers.recv().await {
            got.push(h);
        }
        assert_eq!(got, headers);
        assert!(stream.errors.await.is_err(), "clean end reports no error");
    }

    #[tokio::test]
    async fn malformed_head_is_reported_once() {
        let server = MockServer::start().await;
        let good = serde_json::to_string(&shell_header(chain().head())).unwrap();
        let bad = json!({"hash": Base58Hash::new(vec![1; 32]).to_string(), "level": "x"});
        Mock::given(method("GET"))
            .and(path("/monitor/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("{good}{bad}")))
            .mount(&server)
            .await;

        let mut stream = rpc(&server).stream_heads(CancellationToken::new()).await.unwrap();
        assert!(stream.headers.recv().await.is_some());
        assert!(stream.headers.recv().await.is_none());
        let err = stream.errors.await.unwrap();
        assert!(matches!(err, RpcError::Decode { endpoint: "monitor_heads", .. }));
    }

    #[tokio::test]
    async fn truncated_head_is_reported() {
        let server = MockServer::start().await;
        let good = serde_json::to_string(&shell_header(chain().head())).unwrap();
        Mock::given(method("GET"))
            .and(path("/monitor/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_string(&good[..good.len() / 2]))
            .mount(&server)
            .await;

        let mut stream = rpc(&server).stream_heads(CancellationToken::new()).await.unwrap();
        assert!(stream.headers.recv().await.is_none());
        assert!(matches!(stream.errors.await.unwrap(), RpcError::Truncated { .. }));
    }

    #[tokio::test]
    async fn failed_subscription_errors_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/monitor/heads/main"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = rpc(&server).stream_heads(CancellationToken::new()).await.err().unwrap();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    }
}
