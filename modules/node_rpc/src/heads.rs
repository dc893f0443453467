//! Decoding of the `/monitor/heads` stream: concatenated JSON documents
//! arriving in arbitrary chunks.

use crate::RpcError;
use futures_util::StreamExt;
use tezstat_common::ShellHeader;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const ENDPOINT: &str = "monitor_heads";

/// Decodes every complete document at the front of `buf` into `out` and
/// removes it. A trailing partial document stays in `buf`. Documents before
/// a malformed one are still delivered.
pub(crate) fn drain_documents(
    buf: &mut Vec<u8>,
    out: &mut Vec<ShellHeader>,
) -> Result<(), serde_json::Error> {
    let (consumed, result) = {
        let mut stream = serde_json::Deserializer::from_slice(buf).into_iter::<ShellHeader>();
        loop {
            match stream.next() {
                Some(Ok(header)) => out.push(header),
                Some(Err(e)) if e.is_eof() => break (stream.byte_offset(), Ok(())),
                Some(Err(e)) => break (stream.byte_offset(), Err(e)),
                None => break (stream.byte_offset(), Ok(())),
            }
        }
    };
    buf.drain(..consumed);
    result
}

/// Pumps decoded heads from `response` into `headers` until the body ends,
/// an error occurs or `token` is cancelled.
pub(crate) async fn pump(
    response: reqwest::Response,
    headers: mpsc::Sender<ShellHeader>,
    errors: oneshot::Sender<RpcError>,
    token: CancellationToken,
) {
    if let Err(e) = forward(response, &headers, &token).await {
        debug!("Head feed terminated: {e}");
        let _ = errors.send(e);
    } else {
        info!("Head feed ended");
    }
}

async fn forward(
    response: reqwest::Response,
    headers: &mpsc::Sender<ShellHeader>,
    token: &CancellationToken,
) -> Result<(), RpcError> {
    let mut body = response.bytes_stream();
    let mut buf = Vec::new();
    loop {
        let chunk = tokio::select! {
            _ = token.cancelled() => return Err(RpcError::Cancelled),
            chunk = body.next() => chunk,
        };
        let Some(chunk) = chunk else {
            break;
        };
        buf.extend_from_slice(&chunk.map_err(RpcError::request(ENDPOINT))?);

        let mut decoded = Vec::new();
        let drained = drain_documents(&mut buf, &mut decoded);
        for header in decoded {
            debug!(level = header.level, hash = %header.hash, "New head");
            tokio::select! {
                _ = token.cancelled() => return Err(RpcError::Cancelled),
                sent = headers.send(header) => {
                    if sent.is_err() {
                        // Receiver gone, nobody left to report to
                        return Ok(());
                    }
                }
            }
        }
        drained.map_err(RpcError::decode(ENDPOINT))?;
    }

    if buf.iter().all(u8::is_ascii_whitespace) {
        Ok(())
    } else {
        Err(RpcError::Truncated { endpoint: ENDPOINT })
    }
}
