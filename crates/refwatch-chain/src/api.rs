use async_trait::async_trait;
use chrono::{DateTime, Utc};
use refwatch_core::{ReferendumInfo, RemarkCall};

use crate::ChainError;

/// Opens independent connections to a chain endpoint.
///
/// Every call yields a fresh connection; nothing is pooled between callers.
/// The connection is released when the returned box is dropped.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ChainApi>, ChainError>;
}

/// Queries against one open chain connection.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Number of referenda ever submitted to the fellowship track.
    async fn referendum_count(&self) -> Result<u32, ChainError>;

    async fn referendum_info(&self, index: u32) -> Result<ReferendumInfo, ChainError>;

    async fn block_hash(&self, number: u32) -> Result<String, ChainError>;

    /// `timestamp.now` in the state of the given block.
    async fn timestamp_at(&self, block_hash: &str) -> Result<DateTime<Utc>, ChainError>;

    /// Encode `system.remark(text)` as this runtime would.
    fn remark_call(&self, text: &str) -> Result<RemarkCall, ChainError>;
}
