//! `system.remark` call encoding.
//!
//! A referendum's proposal is stored either as a preimage lookup (blake2-256 of
//! the SCALE-encoded call) or inline (the encoded call itself). Encoding the
//! remark locally yields both forms so either can be compared.
//!
//! Layout: `[system pallet index, 0x00 (remark call index)] ++ Compact<u32>(len) ++ bytes`.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use parity_scale_codec::{Compact, Encode};
use thiserror::Error;

/// Index of `remark` among `frame_system` calls.
const REMARK_CALL_INDEX: u8 = 0;

type Blake2b256 = Blake2b<U32>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("remark of {0} bytes does not fit a compact u32 length")]
    TooLong(usize),
}

/// Both comparable forms of an encoded `system.remark` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemarkCall {
    /// `0x`-prefixed blake2-256 of the encoded call.
    pub hash: String,
    /// `0x`-prefixed encoded call.
    pub hex: String,
}

impl RemarkCall {
    pub fn encode(system_pallet_index: u8, text: &str) -> Result<Self, EncodeError> {
        let bytes = text.as_bytes();
        let len = u32::try_from(bytes.len()).map_err(|_| EncodeError::TooLong(bytes.len()))?;

        let mut call = Vec::with_capacity(bytes.len() + 7);
        call.push(system_pallet_index);
        call.push(REMARK_CALL_INDEX);
        Compact(len).encode_to(&mut call);
        call.extend_from_slice(bytes);

        Ok(Self {
            hash: blake2_256_hex(&call),
            hex: format!("0x{}", hex::encode(&call)),
        })
    }

    /// True when `proposal_hash` equals either form exactly.
    pub fn matches(&self, proposal_hash: &str) -> bool {
        proposal_hash == self.hash || proposal_hash == self.hex
    }
}

/// `0x`-prefixed blake2b-256 digest of `data`.
pub fn blake2_256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(Blake2b256::digest(data)))
}
