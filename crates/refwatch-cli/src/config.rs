//! Command-line and environment configuration.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;

/// Comment on open RFC pull requests whose approval remark is up for an
/// ongoing fellowship referendum.
#[derive(Debug, Parser)]
#[command(name = "refwatch", version, about)]
pub struct Cli {
    /// Owner of the repository holding the RFC pull requests.
    #[arg(long, env = "REFWATCH_OWNER")]
    pub owner: String,

    /// Repository holding the RFC pull requests.
    #[arg(long, env = "REFWATCH_REPO")]
    pub repo: String,

    /// Ignore referenda submitted before this moment (RFC 3339 or YYYY-MM-DD).
    #[arg(long, env = "REFWATCH_SINCE", default_value = "1970-01-01", value_parser = parse_since)]
    pub since: DateTime<Utc>,

    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    pub github_token: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api: String,

    /// Substrate API Sidecar serving the collectives chain.
    #[arg(long, env = "REFWATCH_CHAIN_URL", default_value = "http://127.0.0.1:8080")]
    pub chain_url: String,

    /// Link prefix for referenda; the index is appended.
    #[arg(
        long,
        env = "REFWATCH_REFERENDA_URL",
        default_value = "https://collectives.polkassembly.io/member-referenda"
    )]
    pub referenda_url: String,

    /// File the run summary is appended to; printed to stdout when unset.
    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    pub summary_path: Option<PathBuf>,
}

/// Accept a full RFC 3339 timestamp or a bare date (midnight UTC).
pub fn parse_since(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("`{s}` is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"))
}
