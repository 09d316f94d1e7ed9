//! Records passed between the stages of a run.

use serde::{Deserialize, Serialize};

/// An ongoing fellowship referendum that survived the cutoff filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferendumRecord {
    pub index: u32,
    /// Proposal hash (lookup) or inline call hex, `0x`-prefixed.
    pub hash: String,
    pub url: String,
}

/// The approval remark extracted from one open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRemark {
    pub pr_number: u64,
    /// Web link to the pull request, as reported by the GitHub API.
    pub html_url: String,
    pub remark_text: String,
}

/// A pull request whose remark encodes to an ongoing referendum's proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub pr_number: u64,
    pub pr_url: String,
    pub referendum_index: u32,
    pub referendum_url: String,
}
