use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Failed to initialize HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),

    #[error("{endpoint}: HTTP {status}: {body}")]
    Http {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint}: request failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint}: truncated response")]
    Truncated { endpoint: &'static str },

    #[error("cancelled")]
    Cancelled,
}

impl RpcError {
    pub(crate) fn request(endpoint: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| RpcError::Request { endpoint, source }
    }

    pub(crate) fn decode(endpoint: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| RpcError::Decode { endpoint, source }
    }

    /// HTTP status of a non-success response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RpcError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
