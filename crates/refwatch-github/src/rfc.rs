//! Approval remarks for RFC pull requests.
//!
//! An RFC pull request adds exactly one Markdown document under `text/`. The
//! remark the fellowship puts on chain to approve it is
//! `RFC_APPROVE(<number>,<blake2-256 of the document>)`, with the pull request
//! number zero-padded to four digits.

use async_trait::async_trait;
use refwatch_core::blake2_256_hex;

use crate::{ExtractError, GithubClient, RemarkExtractor, RfcResult};

const RFC_DIR: &str = "text/";

pub struct RfcRemarkExtractor<'a> {
    github: &'a GithubClient,
}

impl<'a> RfcRemarkExtractor<'a> {
    pub fn new(github: &'a GithubClient) -> Self {
        Self { github }
    }
}

/// Remark text approving RFC `number` whose document is `content`.
pub fn approve_remark(number: u64, content: &str) -> String {
    format!(
        "RFC_APPROVE({number:04},{})",
        blake2_256_hex(content.as_bytes())
    )
}

fn is_rfc_document(filename: &str) -> bool {
    filename.starts_with(RFC_DIR) && filename.ends_with(".md")
}

#[async_trait]
impl RemarkExtractor for RfcRemarkExtractor<'_> {
    async fn extract(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<RfcResult, ExtractError> {
        let files = self.github.list_pull_files(owner, repo, number).await?;
        let added: Vec<_> = files
            .iter()
            .filter(|f| f.status == "added" && is_rfc_document(&f.filename))
            .collect();

        let [document] = added.as_slice() else {
            return Err(ExtractError::Rejected(format!(
                "RFC pull requests are expected to add exactly one file under {RFC_DIR}, found {}",
                added.len()
            )));
        };

        let content = self.github.fetch_raw(&document.contents_url).await?;
        Ok(RfcResult {
            approve_remark_text: approve_remark(number, &content),
        })
    }
}
