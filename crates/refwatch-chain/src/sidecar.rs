//! Chain access through a Substrate API Sidecar instance.
//!
//! Sidecar serves decoded storage as JSON, so referendum entries arrive in the
//! same shape [`ReferendumInfo::from_json`] expects. Numbers come back as
//! decimal strings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use refwatch_core::referendum::as_u64;
use refwatch_core::{ReferendumInfo, RemarkCall};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::{ChainApi, ChainConnector, ChainError};

const REFERENDA_PALLET: &str = "fellowshipReferenda";

/// Opens connections to a Sidecar base URL such as `http://localhost:8080`.
pub struct SidecarConnector {
    base_url: String,
}

impl SidecarConnector {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChainConnector for SidecarConnector {
    /// Build a dedicated HTTP client and resolve the `System` pallet index,
    /// which doubles as a reachability check.
    async fn connect(&self) -> Result<Box<dyn ChainApi>, ChainError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ChainError::Connect(e.to_string()))?;

        info!(url = %self.base_url, "connecting to chain");
        let url = format!("{}/pallets/system/dispatchables/remark", self.base_url);
        let pallet: PalletItem = get_json(&client, &url, &[])
            .await
            .map_err(|e| ChainError::Connect(e.to_string()))?;
        let system_pallet_index = as_u64("palletIndex", &pallet.pallet_index)
            .ok()
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| ChainError::Malformed {
                what: "system pallet index",
                detail: pallet.pallet_index.to_string(),
            })?;

        Ok(Box::new(SidecarConnection {
            client,
            base_url: self.base_url.clone(),
            system_pallet_index,
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PalletItem {
    pallet_index: Value,
}

#[derive(Deserialize)]
struct StorageItem {
    value: Value,
}

#[derive(Deserialize)]
struct Block {
    hash: String,
}

struct SidecarConnection {
    client: reqwest::Client,
    base_url: String,
    system_pallet_index: u8,
}

impl Drop for SidecarConnection {
    fn drop(&mut self) {
        debug!(url = %self.base_url, "chain connection released");
    }
}

async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ChainError> {
    debug!(url = %url, "sidecar request");
    let resp = client.get(url).query(query).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ChainError::Server {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl SidecarConnection {
    async fn storage(
        &self,
        pallet: &str,
        item: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ChainError> {
        let url = format!("{}/pallets/{pallet}/storage/{item}", self.base_url);
        let item: StorageItem = get_json(&self.client, &url, query).await?;
        Ok(item.value)
    }
}

#[async_trait]
impl ChainApi for SidecarConnection {
    async fn referendum_count(&self) -> Result<u32, ChainError> {
        let value = self.storage(REFERENDA_PALLET, "referendumCount", &[]).await?;
        let count = as_u64("referendumCount", &value).map_err(|e| ChainError::Malformed {
            what: "referendum count",
            detail: e.to_string(),
        })?;
        u32::try_from(count).map_err(|_| ChainError::Malformed {
            what: "referendum count",
            detail: count.to_string(),
        })
    }

    async fn referendum_info(&self, index: u32) -> Result<ReferendumInfo, ChainError> {
        let keys = [("keys[]", index.to_string())];
        let value = self
            .storage(REFERENDA_PALLET, "referendumInfoFor", &keys)
            .await?;
        ReferendumInfo::from_json(&value).map_err(|source| ChainError::Decode { index, source })
    }

    async fn block_hash(&self, number: u32) -> Result<String, ChainError> {
        let url = format!("{}/blocks/{number}", self.base_url);
        let query = [("noFees", "true".to_string())];
        let block: Block = get_json(&self.client, &url, &query).await?;
        Ok(block.hash)
    }

    async fn timestamp_at(&self, block_hash: &str) -> Result<DateTime<Utc>, ChainError> {
        let at = [("at", block_hash.to_string())];
        let value = self.storage("timestamp", "now", &at).await?;
        as_u64("timestamp", &value)
            .ok()
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| ChainError::Malformed {
                what: "timestamp",
                detail: value.to_string(),
            })
    }

    fn remark_call(&self, text: &str) -> Result<RemarkCall, ChainError> {
        Ok(RemarkCall::encode(self.system_pallet_index, text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use serde_json::json;

    async fn mock_system(server: &mut Server, index: &str) -> mockito::Mock {
        server
            .mock("GET", "/pallets/system/dispatchables/remark")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "pallet": "system",
                    "palletIndex": index,
                    "dispatchableItem": "remark"
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    fn storage_body(value: Value) -> String {
        json!({ "at": { "hash": "0x01", "height": "1" }, "value": value }).to_string()
    }

    #[test]
    fn connector_trims_trailing_slash() {
        let connector = SidecarConnector::new("http://localhost:8080/".into());
        assert_eq!(connector.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn connect_reads_system_pallet_index() {
        let mut server = Server::new_async().await;
        let system = mock_system(&mut server, "3").await;

        let conn = SidecarConnector::new(server.url()).connect().await.unwrap();
        let call = conn.remark_call("hi").unwrap();

        system.assert_async().await;
        assert!(call.hex.starts_with("0x0300"));
    }

    #[tokio::test]
    async fn connect_failure_maps_to_connect_error() {
        let mut server = Server::new_async().await;
        let _offline = server
            .mock("GET", "/pallets/system/dispatchables/remark")
            .with_status(503)
            .with_body("node offline")
            .create_async()
            .await;

        let result = SidecarConnector::new(server.url()).connect().await;
        assert!(matches!(result, Err(ChainError::Connect(msg)) if msg.contains("503")));
    }

    #[tokio::test]
    async fn reads_count_info_block_and_timestamp() {
        let mut server = Server::new_async().await;
        let _system = mock_system(&mut server, "0").await;
        let _count = server
            .mock("GET", "/pallets/fellowshipReferenda/storage/referendumCount")
            .with_body(storage_body(json!("12")))
            .create_async()
            .await;
        let _info = server
            .mock("GET", "/pallets/fellowshipReferenda/storage/referendumInfoFor")
            .match_query(Matcher::UrlEncoded("keys[]".into(), "7".into()))
            .with_body(storage_body(json!({
                "ongoing": {
                    "track": "3",
                    "proposal": { "inline": "0xabc" },
                    "submitted": "100"
                }
            })))
            .create_async()
            .await;
        let _block = server
            .mock("GET", "/blocks/100")
            .match_query(Matcher::UrlEncoded("noFees".into(), "true".into()))
            .with_body(json!({ "number": "100", "hash": "0xfeed" }).to_string())
            .create_async()
            .await;
        let _now = server
            .mock("GET", "/pallets/timestamp/storage/now")
            .match_query(Matcher::UrlEncoded("at".into(), "0xfeed".into()))
            .with_body(storage_body(json!("1706745600000")))
            .create_async()
            .await;

        let conn = SidecarConnector::new(server.url()).connect().await.unwrap();

        assert_eq!(conn.referendum_count().await.unwrap(), 12);
        let ReferendumInfo::Ongoing(status) = conn.referendum_info(7).await.unwrap() else {
            panic!("expected ongoing");
        };
        assert_eq!(status.submitted, 100);
        assert_eq!(status.proposal.content_hash(), Some("0xabc"));
        let hash = conn.block_hash(status.submitted).await.unwrap();
        assert_eq!(hash, "0xfeed");
        assert_eq!(
            conn.timestamp_at(&hash).await.unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn malformed_count_is_an_error() {
        let mut server = Server::new_async().await;
        let _system = mock_system(&mut server, "0").await;
        let _count = server
            .mock("GET", "/pallets/fellowshipReferenda/storage/referendumCount")
            .with_body(storage_body(json!({ "unexpected": true })))
            .create_async()
            .await;

        let conn = SidecarConnector::new(server.url()).connect().await.unwrap();
        assert!(matches!(
            conn.referendum_count().await,
            Err(ChainError::Malformed { what: "referendum count", .. })
        ));
    }

    #[tokio::test]
    async fn empty_slot_decodes_as_other() {
        let mut server = Server::new_async().await;
        let _system = mock_system(&mut server, "0").await;
        let _info = server
            .mock("GET", "/pallets/fellowshipReferenda/storage/referendumInfoFor")
            .match_query(Matcher::Any)
            .with_body(storage_body(Value::Null))
            .create_async()
            .await;

        let conn = SidecarConnector::new(server.url()).connect().await.unwrap();
        assert_eq!(
            conn.referendum_info(0).await.unwrap(),
            ReferendumInfo::Other("none".into())
        );
    }
}
