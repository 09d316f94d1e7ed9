//! In-memory GitHub and extractor used by tests across the workspace.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{BaseRepo, IssueComment, Owner, PullBase, PullRequest};
use crate::{ExtractError, GithubError, PullRequestApi, RemarkExtractor, RfcResult};

/// A comment recorded by [`FakeGithub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub body: String,
}

#[derive(Default)]
pub struct FakeGithub {
    pulls: Vec<PullRequest>,
    fail_listing: bool,
    fail_comment_on: Option<u64>,
    comments: Mutex<Vec<PostedComment>>,
}

impl FakeGithub {
    /// Open pull requests with the given numbers, listed in that order.
    pub fn with_pulls(owner: &str, repo: &str, numbers: &[u64]) -> Self {
        let pulls = numbers
            .iter()
            .map(|&number| PullRequest {
                number,
                title: format!("PR {number}"),
                html_url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
                base: PullBase {
                    repo: BaseRepo {
                        name: repo.to_string(),
                        owner: Owner {
                            login: owner.to_string(),
                        },
                    },
                },
            })
            .collect();
        Self {
            pulls,
            ..Self::default()
        }
    }

    /// Serve pull request links from `web_root` instead of github.com.
    pub fn hosted_at(mut self, web_root: &str) -> Self {
        let web_root = web_root.trim_end_matches('/');
        for pr in &mut self.pulls {
            let base = &pr.base.repo;
            pr.html_url = format!(
                "{web_root}/{}/{}/pull/{}",
                base.owner.login, base.name, pr.number
            );
        }
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_comment_on(mut self, number: u64) -> Self {
        self.fail_comment_on = Some(number);
        self
    }

    pub fn comments(&self) -> Vec<PostedComment> {
        self.comments.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PullRequestApi for FakeGithub {
    async fn list_open_pulls(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> Result<Vec<PullRequest>, GithubError> {
        if self.fail_listing {
            return Err(GithubError::Server {
                status: 502,
                body: "Bad Gateway".into(),
            });
        }
        Ok(self.pulls.clone())
    }

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<IssueComment, GithubError> {
        if self.fail_comment_on == Some(number) {
            return Err(GithubError::Server {
                status: 403,
                body: "Resource not accessible by integration".into(),
            });
        }
        let mut comments = self.comments.lock().map_err(|e| GithubError::Server {
            status: 500,
            body: e.to_string(),
        })?;
        comments.push(PostedComment {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            body: body.to_string(),
        });
        Ok(IssueComment {
            id: comments.len() as u64,
        })
    }
}

/// Extractor with a fixed outcome per pull request number.
///
/// Pull requests without a configured outcome are rejected.
#[derive(Default)]
pub struct FakeExtractor {
    outcomes: HashMap<u64, Result<String, String>>,
    calls: Mutex<Vec<(String, String, u64)>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remark(mut self, number: u64, remark: &str) -> Self {
        self.outcomes.insert(number, Ok(remark.to_string()));
        self
    }

    pub fn with_failure(mut self, number: u64, reason: &str) -> Self {
        self.outcomes.insert(number, Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(String, String, u64)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RemarkExtractor for FakeExtractor {
    async fn extract(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<RfcResult, ExtractError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((owner.to_string(), repo.to_string(), number));
        }
        match self.outcomes.get(&number) {
            Some(Ok(text)) => Ok(RfcResult {
                approve_remark_text: text.clone(),
            }),
            Some(Err(reason)) => Err(ExtractError::Rejected(reason.clone())),
            None => Err(ExtractError::Rejected(format!("no remark for #{number}"))),
        }
    }
}
