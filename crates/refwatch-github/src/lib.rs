//! GitHub side of a run: REST client, per-PR remark extraction, RFC approval remarks.

pub mod client;
pub mod extract;
pub mod rfc;

pub use client::{GithubClient, GithubError, PullRequest, PullRequestApi};
pub use extract::{ExtractError, RemarkExtractor, RfcResult, collect_pr_remarks};
pub use rfc::RfcRemarkExtractor;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
