mod config;
mod notify;
mod run;
mod summary;

use anyhow::Context;
use clap::Parser;
use refwatch_chain::SidecarConnector;
use refwatch_core::TracingLogger;
use refwatch_github::{GithubClient, RfcRemarkExtractor};
use tracing_subscriber::EnvFilter;

use crate::config::Cli;
use crate::run::SearchParams;
use crate::summary::SummarySink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("refwatch v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let github = GithubClient::new(cli.github_api.clone(), &cli.github_token)
        .context("building GitHub client")?;
    let chain = SidecarConnector::new(cli.chain_url.clone());
    let extractor = RfcRemarkExtractor::new(&github);
    let logger = TracingLogger;

    let params = SearchParams {
        owner: &cli.owner,
        repo: &cli.repo,
        since: cli.since,
        referenda_url: &cli.referenda_url,
    };
    tracing::info!(
        owner = %params.owner,
        repo = %params.repo,
        since = %params.since,
        "searching for referenda"
    );

    let summary = run::search_referenda(&chain, &github, &extractor, &logger, &params).await?;

    let sink = match cli.summary_path {
        Some(path) => SummarySink::File(path),
        None => SummarySink::Stdout,
    };
    summary.write(&sink)
}
