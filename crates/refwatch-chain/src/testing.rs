//! In-memory chain used by tests across the workspace.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use refwatch_core::{OngoingStatus, Proposal, ReferendumInfo, RemarkCall};
use serde_json::Value;

use crate::{ChainApi, ChainConnector, ChainError};

/// Build an ongoing referendum submitted at `submitted` with the given proposal.
pub fn ongoing(submitted: u32, proposal: Proposal) -> ReferendumInfo {
    ReferendumInfo::Ongoing(OngoingStatus {
        track: 1,
        origin: Value::Null,
        proposal,
        enactment: Value::Null,
        submitted,
        submission_deposit: Value::Null,
        decision_deposit: None,
        deciding: None,
        tally: Value::Null,
        in_queue: false,
        alarm: None,
    })
}

/// A chain whose referenda and block times are fixed up front.
///
/// Counts how many connections were opened and how many were dropped.
#[derive(Clone, Default)]
pub struct FakeChain {
    referenda: Vec<ReferendumInfo>,
    block_times: HashMap<u32, DateTime<Utc>>,
    system_pallet_index: u8,
    fail_connect: bool,
    fail_info_at: Option<u32>,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a referendum at the next index.
    pub fn with_referendum(mut self, info: ReferendumInfo) -> Self {
        self.referenda.push(info);
        self
    }

    pub fn with_block_time(mut self, block: u32, at: DateTime<Utc>) -> Self {
        self.block_times.insert(block, at);
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_info_at(mut self, index: u32) -> Self {
        self.fail_info_at = Some(index);
        self
    }

    pub fn system_pallet_index(&self) -> u8 {
        self.system_pallet_index
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainConnector for FakeChain {
    async fn connect(&self) -> Result<Box<dyn ChainApi>, ChainError> {
        if self.fail_connect {
            return Err(ChainError::Connect("connection refused".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            chain: self.clone(),
        }))
    }
}

struct FakeConnection {
    chain: FakeChain,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.chain.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainApi for FakeConnection {
    async fn referendum_count(&self) -> Result<u32, ChainError> {
        Ok(self.chain.referenda.len() as u32)
    }

    async fn referendum_info(&self, index: u32) -> Result<ReferendumInfo, ChainError> {
        if self.chain.fail_info_at == Some(index) {
            return Err(ChainError::Server {
                status: 500,
                body: format!("storage query for {index} failed"),
            });
        }
        Ok(self
            .chain
            .referenda
            .get(index as usize)
            .cloned()
            .unwrap_or_else(|| ReferendumInfo::Other("none".into())))
    }

    async fn block_hash(&self, number: u32) -> Result<String, ChainError> {
        Ok(format!("0x{number:064x}"))
    }

    async fn timestamp_at(&self, block_hash: &str) -> Result<DateTime<Utc>, ChainError> {
        let number = u32::from_str_radix(block_hash.trim_start_matches("0x"), 16).map_err(|e| {
            ChainError::Malformed {
                what: "block hash",
                detail: e.to_string(),
            }
        })?;
        self.chain
            .block_times
            .get(&number)
            .copied()
            .ok_or_else(|| ChainError::Malformed {
                what: "timestamp",
                detail: format!("no time recorded for block {number}"),
            })
    }

    fn remark_call(&self, text: &str) -> Result<RemarkCall, ChainError> {
        Ok(RemarkCall::encode(self.chain.system_pallet_index, text)?)
    }
}
