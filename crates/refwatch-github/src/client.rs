//! HTTP client for the GitHub REST API.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// GitHub's maximum page size for list endpoints.
pub const PAGE_SIZE: usize = 100;

const API_VERSION: &str = "2022-11-28";

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API answered {status}: {body}")]
    Server { status: u16, body: String },
    #[error("unexpected GitHub response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GitHub token is not a valid header value: {0}")]
    Token(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub html_url: String,
    pub base: PullBase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullBase {
    pub repo: BaseRepo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaseRepo {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// One changed file of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullFile {
    pub filename: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    pub status: String,
    pub contents_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// The pull request operations a run depends on.
#[async_trait]
pub trait PullRequestApi: Send + Sync {
    /// Every open pull request, all pages drained, in listing order.
    async fn list_open_pulls(&self, owner: &str, repo: &str)
    -> Result<Vec<PullRequest>, GithubError>;

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, GithubError>;
}

/// Authenticated GitHub REST client.
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    /// `api_url` is `https://api.github.com` or a GitHub Enterprise API root.
    pub fn new(api_url: String, token: &str) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GithubError::Token(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("refwatch/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Files changed by a pull request, all pages drained.
    pub async fn list_pull_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullFile>, GithubError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}/files", self.api_url);
        self.get_all_pages(&url, &[]).await
    }

    /// Raw text of a file, addressed by its `contents_url`.
    pub async fn fetch_raw(&self, contents_url: &str) -> Result<String, GithubError> {
        debug!(url = %contents_url, "fetching raw contents");
        let resp = self
            .client
            .get(contents_url)
            .header(ACCEPT, "application/vnd.github.raw+json")
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }

    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, GithubError> {
        let mut items = Vec::new();
        let per_page = PAGE_SIZE.to_string();
        for page in 1usize.. {
            let page_str = page.to_string();
            debug!(url = %url, page, "fetching page");
            let resp = self
                .client
                .get(url)
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page_str.as_str())])
                .send()
                .await?;
            let resp = check_status(resp).await?;
            let bytes = resp.bytes().await?;
            let batch: Vec<T> = serde_json::from_slice(&bytes)?;
            let done = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GithubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GithubError::Server {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl PullRequestApi for GithubClient {
    async fn list_open_pulls(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, GithubError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls", self.api_url);
        info!(owner, repo, "listing open pull requests");
        let pulls: Vec<PullRequest> = self.get_all_pages(&url, &[("state", "open")]).await?;
        info!(count = pulls.len(), "listed open pull requests");
        Ok(pulls)
    }

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, GithubError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/issues/{number}/comments",
            self.api_url
        );
        info!(owner, repo, number, "posting comment");
        let resp = self
            .client
            .post(&url)
            .json(&CommentBody { body })
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
