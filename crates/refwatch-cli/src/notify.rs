//! Match pull request remarks against ongoing referenda and comment on hits.
//!
//! Comments are posted on every match of every run: nothing checks whether an
//! earlier run already left the same comment.

use anyhow::Context;
use refwatch_chain::ChainConnector;
use refwatch_core::{ActionLogger, Match, PrRemark, ReferendumRecord};
use refwatch_github::PullRequestApi;

/// Body of the comment left on a matching pull request.
pub fn comment_body(referendum_url: &str) -> String {
    format!("Voting for this referenda is **ongoing**.\n\nVote for it [here]({referendum_url})")
}

pub struct Notifier<'a> {
    pub connector: &'a dyn ChainConnector,
    pub github: &'a dyn PullRequestApi,
    pub logger: &'a dyn ActionLogger,
    pub owner: &'a str,
    pub repo: &'a str,
}

impl Notifier<'_> {
    /// Comment on each pull request whose remark encodes to a referendum's
    /// proposal and return the matches in pull request order.
    ///
    /// A remark is compared with the referenda in index order and the first
    /// hit wins. Any failure aborts the run; comments already posted stay.
    pub async fn notify(
        &self,
        referenda: &[ReferendumRecord],
        remarks: &[PrRemark],
    ) -> anyhow::Result<Vec<Match>> {
        self.match_and_comment(referenda, remarks)
            .await
            .inspect_err(|e| self.logger.error(&format!("{e:#}")))
            .context("problem during commenting")
    }

    async fn match_and_comment(
        &self,
        referenda: &[ReferendumRecord],
        remarks: &[PrRemark],
    ) -> anyhow::Result<Vec<Match>> {
        let api = self
            .connector
            .connect()
            .await
            .context("connecting to the chain")?;

        let mut matches = Vec::new();
        for remark in remarks {
            let call = api
                .remark_call(&remark.remark_text)
                .with_context(|| format!("encoding remark of PR #{}", remark.pr_number))?;
            let Some(referendum) = referenda.iter().find(|r| call.matches(&r.hash)) else {
                continue;
            };

            self.logger.info(&format!(
                "PR #{} matches referendum #{} ({})",
                remark.pr_number, referendum.index, referendum.url
            ));
            self.github
                .create_comment(
                    self.owner,
                    self.repo,
                    remark.pr_number,
                    &comment_body(&referendum.url),
                )
                .await
                .with_context(|| format!("commenting on PR #{}", remark.pr_number))?;
            matches.push(Match {
                pr_number: remark.pr_number,
                pr_url: remark.html_url.clone(),
                referendum_index: referendum.index,
                referendum_url: referendum.url.clone(),
            });
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refwatch_chain::testing::FakeChain;
    use refwatch_core::{LogLevel, RecordingLogger, RemarkCall};
    use refwatch_github::testing::FakeGithub;

    const URL: &str = "https://collectives.polkassembly.io/member-referenda";

    fn remark(pr_number: u64, text: &str) -> PrRemark {
        PrRemark {
            pr_number,
            html_url: format!("https://github.com/o/r/pull/{pr_number}"),
            remark_text: text.into(),
        }
    }

    fn referendum(index: u32, hash: String) -> ReferendumRecord {
        ReferendumRecord {
            index,
            hash,
            url: format!("{URL}/{index}"),
        }
    }

    fn encode(chain: &FakeChain, text: &str) -> RemarkCall {
        RemarkCall::encode(chain.system_pallet_index(), text).unwrap()
    }

    fn notifier<'a>(
        chain: &'a FakeChain,
        github: &'a FakeGithub,
        logger: &'a RecordingLogger,
    ) -> Notifier<'a> {
        Notifier {
            connector: chain,
            github,
            logger,
            owner: "o",
            repo: "r",
        }
    }

    #[tokio::test]
    async fn hashed_and_hex_forms_both_match() {
        let chain = FakeChain::new();
        let github = FakeGithub::with_pulls("o", "r", &[1, 2, 3]);
        let logger = RecordingLogger::new();
        let referenda = vec![
            referendum(4, encode(&chain, "RFC_APPROVE(0001,0xa)").hash),
            referendum(5, encode(&chain, "RFC_APPROVE(0002,0xb)").hex),
        ];
        let remarks = vec![
            remark(1, "RFC_APPROVE(0001,0xa)"),
            remark(2, "RFC_APPROVE(0002,0xb)"),
            remark(3, "RFC_APPROVE(0003,0xc)"),
        ];

        let matches = notifier(&chain, &github, &logger)
            .notify(&referenda, &remarks)
            .await
            .unwrap();

        let pairs: Vec<_> = matches
            .iter()
            .map(|m| (m.pr_number, m.referendum_index))
            .collect();
        assert_eq!(pairs, vec![(1, 4), (2, 5)]);
        let comments = github.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].number, 1);
        assert_eq!(comments[0].body, comment_body(&format!("{URL}/4")));
        assert_eq!(chain.opened(), 1);
        assert_eq!(chain.released(), 1);
    }

    #[tokio::test]
    async fn first_referendum_in_index_order_wins() {
        // Two referenda carrying the same proposal: only the lower index is reported.
        let chain = FakeChain::new();
        let github = FakeGithub::with_pulls("o", "r", &[9]);
        let logger = RecordingLogger::new();
        let call = encode(&chain, "RFC_APPROVE(0009,0x9)");
        let referenda = vec![referendum(2, call.hex), referendum(6, call.hash)];

        let matches = notifier(&chain, &github, &logger)
            .notify(&referenda, &[remark(9, "RFC_APPROVE(0009,0x9)")])
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].referendum_index, 2);
        assert_eq!(github.comments().len(), 1);
    }

    #[tokio::test]
    async fn no_match_posts_nothing() {
        let chain = FakeChain::new();
        let github = FakeGithub::with_pulls("o", "r", &[1]);
        let logger = RecordingLogger::new();

        let matches = notifier(&chain, &github, &logger)
            .notify(&[referendum(0, "0xabc".into())], &[remark(1, "unrelated")])
            .await
            .unwrap();

        assert!(matches.is_empty());
        assert!(github.comments().is_empty());
    }

    #[tokio::test]
    async fn comment_failure_is_wrapped_and_earlier_comments_stay() {
        let chain = FakeChain::new();
        let github = FakeGithub::with_pulls("o", "r", &[1, 2]).failing_comment_on(2);
        let logger = RecordingLogger::new();
        let referenda = vec![
            referendum(0, encode(&chain, "one").hash),
            referendum(1, encode(&chain, "two").hash),
        ];

        let err = notifier(&chain, &github, &logger)
            .notify(&referenda, &[remark(1, "one"), remark(2, "two")])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "problem during commenting");
        assert!(format!("{err:#}").contains("403"));
        assert_eq!(github.comments().len(), 1);
        assert_eq!(chain.released(), 1);
        assert_eq!(logger.at(LogLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn connect_failure_is_wrapped() {
        let chain = FakeChain::new().failing_connect();
        let github = FakeGithub::with_pulls("o", "r", &[]);
        let logger = RecordingLogger::new();

        let err = notifier(&chain, &github, &logger)
            .notify(&[], &[])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "problem during commenting");
        assert!(format!("{err:#}").contains("connection refused"));
    }

    #[tokio::test]
    async fn rerun_posts_duplicate_comments() {
        // Comments are not deduplicated across runs.
        let chain = FakeChain::new();
        let github = FakeGithub::with_pulls("o", "r", &[42]);
        let logger = RecordingLogger::new();
        let referenda = vec![referendum(7, encode(&chain, "RFC_APPROVE(0042,0x1)").hash)];
        let remarks = vec![remark(42, "RFC_APPROVE(0042,0x1)")];
        let notifier = notifier(&chain, &github, &logger);

        notifier.notify(&referenda, &remarks).await.unwrap();
        notifier.notify(&referenda, &remarks).await.unwrap();

        let comments = github.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0], comments[1]);
        assert_eq!(chain.opened(), 2);
        assert_eq!(chain.released(), 2);
    }

    #[tokio::test]
    async fn match_links_to_the_pull_request_host() {
        let chain = FakeChain::new();
        let github = FakeGithub::with_pulls("o", "r", &[1]);
        let logger = RecordingLogger::new();
        let referenda = vec![referendum(3, encode(&chain, "RFC_APPROVE(0001,0x1)").hash)];
        let remarks = vec![PrRemark {
            html_url: "https://git.example.com/o/r/pull/1".into(),
            ..remark(1, "RFC_APPROVE(0001,0x1)")
        }];

        let matches = notifier(&chain, &github, &logger)
            .notify(&referenda, &remarks)
            .await
            .unwrap();

        assert_eq!(matches[0].pr_url, "https://git.example.com/o/r/pull/1");
    }
}
