use refwatch_core::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("could not connect to chain endpoint: {0}")]
    Connect(String),

    #[cfg(feature = "sidecar")]
    #[error("sidecar request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chain endpoint returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("unexpected chain response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("referendum {index}: {source}")]
    Decode {
        index: u32,
        #[source]
        source: DecodeError,
    },

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("remark encoding failed: {0}")]
    Encode(#[from] EncodeError),
}
