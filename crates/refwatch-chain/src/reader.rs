//! Fellowship referenda scan.
//!
//! Walks every index of the track in ascending order and keeps the referenda
//! that are still ongoing, were submitted at or after the cutoff, and carry a
//! proposal hash that a remark can be compared against.

use chrono::{DateTime, Utc};
use refwatch_core::{ActionLogger, ReferendumInfo, ReferendumRecord};

use crate::{ChainApi, ChainConnector, ChainError};

pub struct ReferendaReader<'a> {
    connector: &'a dyn ChainConnector,
    logger: &'a dyn ActionLogger,
    /// Link prefix; the referendum index is appended.
    referenda_url: String,
}

impl<'a> ReferendaReader<'a> {
    pub fn new(
        connector: &'a dyn ChainConnector,
        logger: &'a dyn ActionLogger,
        referenda_url: &str,
    ) -> Self {
        Self {
            connector,
            logger,
            referenda_url: referenda_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ongoing referenda submitted at or after `cutoff`, ordered by index.
    ///
    /// Any chain failure aborts the scan; no partial list is returned.
    pub async fn ongoing_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ReferendumRecord>, ChainError> {
        let logger = self.logger;
        let api = self
            .connector
            .connect()
            .await
            .inspect_err(|e| logger.error(&format!("Chain connection failed: {e}")))?;
        // `api` is dropped on every return path below, releasing the connection.
        let records = self.scan(api.as_ref(), cutoff).await;
        records.inspect_err(|e| logger.error(&format!("Reading referenda failed: {e}")))
    }

    async fn scan(
        &self,
        api: &dyn ChainApi,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<ReferendumRecord>, ChainError> {
        let count = api.referendum_count().await?;
        self.logger.info(&format!("Fellowship track holds {count} referenda"));

        let mut records = Vec::new();
        for index in 0..count {
            let status = match api.referendum_info(index).await? {
                ReferendumInfo::Ongoing(status) => status,
                ReferendumInfo::Other(kind) => {
                    let message = format!("Referendum #{index} is {kind}, not ongoing");
                    self.logger.debug(&message);
                    continue;
                }
            };

            let block_hash = api.block_hash(status.submitted).await?;
            let submitted_at = api.timestamp_at(&block_hash).await?;
            if submitted_at < cutoff {
                self.logger.info(&format!(
                    "Referendum #{index} predates {cutoff} ({submitted_at}); left to a previous run"
                ));
                continue;
            }

            let Some(hash) = status.proposal.content_hash() else {
                self.logger.warn(&format!(
                    "Referendum #{index} has neither a lookup nor an inline proposal hash"
                ));
                continue;
            };

            let message = format!("Referendum #{index} is ongoing with hash {hash}");
            self.logger.debug(&message);
            records.push(ReferendumRecord {
                index,
                hash: hash.to_string(),
                url: format!("{}/{index}", self.referenda_url),
            });
        }

        self.logger.info(&format!("Found {} ongoing referenda", records.len()));
        Ok(records)
    }
}
