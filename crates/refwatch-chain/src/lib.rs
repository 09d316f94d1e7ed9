//! Chain layer: the endpoint trait, the Sidecar HTTP client, and the fellowship referenda reader.

mod api;
mod error;
pub mod reader;

pub use api::{ChainApi, ChainConnector};
pub use error::ChainError;
pub use reader::ReferendaReader;

#[cfg(feature = "sidecar")]
pub mod sidecar;
#[cfg(feature = "sidecar")]
pub use sidecar::SidecarConnector;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
