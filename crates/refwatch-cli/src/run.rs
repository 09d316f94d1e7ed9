//! One referenda search: scan the chain, collect PR remarks, comment, summarise.

use anyhow::Context;
use chrono::{DateTime, Utc};
use refwatch_chain::{ChainConnector, ReferendaReader};
use refwatch_core::ActionLogger;
use refwatch_github::{PullRequestApi, RemarkExtractor, collect_pr_remarks};

use crate::notify::Notifier;
use crate::summary::{self, Summary};

pub struct SearchParams<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub since: DateTime<Utc>,
    pub referenda_url: &'a str,
}

/// Run the whole search and return the summary to publish.
///
/// With no ongoing referenda the pull requests are never listed.
pub async fn search_referenda(
    chain: &dyn ChainConnector,
    github: &dyn PullRequestApi,
    extractor: &dyn RemarkExtractor,
    logger: &dyn ActionLogger,
    params: &SearchParams<'_>,
) -> anyhow::Result<Summary> {
    let referenda = ReferendaReader::new(chain, logger, params.referenda_url)
        .ongoing_since(params.since)
        .await
        .context("reading fellowship referenda")?;
    if referenda.is_empty() {
        logger.info("No ongoing referenda found");
        return Ok(summary::no_referenda());
    }

    let remarks = collect_pr_remarks(github, extractor, logger, params.owner, params.repo)
        .await
        .inspect_err(|e| logger.error(&format!("Failed to list open pull requests: {e}")))
        .context("listing open pull requests")?;

    let matches = Notifier {
        connector: chain,
        github,
        logger,
        owner: params.owner,
        repo: params.repo,
    }
    .notify(&referenda, &remarks)
    .await?;

    logger.info(&format!("Found {} PRs matching ongoing referenda", matches.len()));
    Ok(summary::matched(&matches))
}
