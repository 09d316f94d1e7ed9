//! Core types shared across refwatch: referendum and PR records, the remark
//! call encoding, and the logging interface handed to each component.

pub mod logger;
pub mod records;
pub mod referendum;
pub mod remark;

pub use logger::{ActionLogger, TracingLogger};
#[cfg(feature = "test-util")]
pub use logger::{LogLevel, RecordingLogger};
pub use records::{Match, PrRemark, ReferendumRecord};
pub use referendum::{DecodeError, OngoingStatus, Proposal, ReferendumInfo};
pub use remark::{EncodeError, RemarkCall, blake2_256_hex};
