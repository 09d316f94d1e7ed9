//! Collects the approval remark of every open pull request.

use async_trait::async_trait;
use refwatch_core::{ActionLogger, PrRemark};
use thiserror::Error;

use crate::{GithubError, PullRequestApi};

/// What a successful extraction yields for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfcResult {
    pub approve_remark_text: String,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Github(#[from] GithubError),
    /// The pull request does not have the shape the extractor needs.
    #[error("{0}")]
    Rejected(String),
}

/// Derives the on-chain remark text tied to a pull request.
#[async_trait]
pub trait RemarkExtractor: Send + Sync {
    async fn extract(&self, owner: &str, repo: &str, number: u64)
    -> Result<RfcResult, ExtractError>;
}

/// One record per open pull request whose remark could be extracted, in
/// listing order. Extraction failures are warned about and skipped; a failure
/// to list the pull requests is returned.
pub async fn collect_pr_remarks(
    github: &dyn PullRequestApi,
    extractor: &dyn RemarkExtractor,
    logger: &dyn ActionLogger,
    owner: &str,
    repo: &str,
) -> Result<Vec<PrRemark>, GithubError> {
    let pulls = github.list_open_pulls(owner, repo).await?;
    logger.info(&format!("Found {} open pull requests in {owner}/{repo}", pulls.len()));

    let mut remarks = Vec::new();
    for pr in &pulls {
        let base = &pr.base.repo;
        match extractor
            .extract(&base.owner.login, &base.name, pr.number)
            .await
        {
            Ok(result) => {
                logger.info(&format!(
                    "Extracted remark from PR #{} ({}): {}",
                    pr.number, pr.title, result.approve_remark_text
                ));
                remarks.push(PrRemark {
                    pr_number: pr.number,
                    html_url: pr.html_url.clone(),
                    remark_text: result.approve_remark_text,
                });
            }
            Err(e) => {
                logger.warn(&format!("Skipping PR #{}: {e}", pr.number));
            }
        }
    }
    Ok(remarks)
}
