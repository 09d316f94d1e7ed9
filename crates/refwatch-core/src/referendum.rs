//! Decoded `fellowshipReferenda.referendumInfoFor` entries.
//!
//! Chain endpoints hand the storage value back as decoded JSON: `null` when the
//! index is unused, otherwise an object with a single key naming the lifecycle
//! state (`ongoing`, `approved`, `rejected`, `cancelled`, `timedOut`, `killed`).
//! Only the ongoing payload is decoded field by field; the rest are kept by name.
//!
//! Integers arrive either as JSON numbers or as decimal strings depending on the
//! endpoint, so every numeric field goes through [`as_u64`].

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected an object with a single status key, got {0}")]
    Shape(String),
    #[error("ongoing referendum is missing `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not an unsigned integer: {value}")]
    NotInteger { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReferendumInfo {
    Ongoing(OngoingStatus),
    /// Any non-ongoing state; holds the status key (`"none"` for an empty slot).
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OngoingStatus {
    pub track: u16,
    pub origin: Value,
    pub proposal: Proposal,
    pub enactment: Value,
    /// Block number the referendum was submitted in.
    pub submitted: u32,
    pub submission_deposit: Value,
    pub decision_deposit: Option<Value>,
    pub deciding: Option<Value>,
    pub tally: Value,
    pub in_queue: bool,
    pub alarm: Option<Value>,
}

/// Where the proposed call lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    /// Preimage reference: hash of the encoded call.
    Lookup { hash: String, len: Option<u32> },
    /// The encoded call itself, hex.
    Inline(String),
    Legacy { hash: String },
    /// No recognisable proposal payload.
    Missing,
}

impl Proposal {
    /// The value a remark encoding is compared against: lookup hash first,
    /// inline call hex second. Legacy and missing proposals yield nothing.
    pub fn content_hash(&self) -> Option<&str> {
        match self {
            Self::Lookup { hash, .. } => Some(hash),
            Self::Inline(bytes) => Some(bytes),
            Self::Legacy { .. } | Self::Missing => None,
        }
    }

    fn from_json(value: Option<&Value>) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return Self::Missing;
        };
        if let Some(hash) = obj
            .get("lookup")
            .and_then(|l| l.get("hash"))
            .and_then(Value::as_str)
        {
            let len = obj
                .get("lookup")
                .and_then(|l| l.get("len"))
                .and_then(|v| as_u64("len", v).ok())
                .and_then(|n| u32::try_from(n).ok());
            return Self::Lookup {
                hash: hash.to_string(),
                len,
            };
        }
        if let Some(bytes) = obj.get("inline").and_then(Value::as_str) {
            return Self::Inline(bytes.to_string());
        }
        if let Some(hash) = obj
            .get("legacy")
            .and_then(|l| l.get("hash"))
            .and_then(Value::as_str)
        {
            return Self::Legacy {
                hash: hash.to_string(),
            };
        }
        Self::Missing
    }
}

impl ReferendumInfo {
    pub fn is_ongoing(&self) -> bool {
        matches!(self, Self::Ongoing(_))
    }

    /// Decode a storage value as returned by the chain endpoint.
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let obj = match value {
            Value::Null => return Ok(Self::Other("none".to_string())),
            Value::Object(obj) if obj.len() == 1 => obj,
            other => return Err(DecodeError::Shape(other.to_string())),
        };
        let (status, payload) = obj
            .iter()
            .next()
            .ok_or_else(|| DecodeError::Shape("{}".into()))?;
        if status != "ongoing" {
            return Ok(Self::Other(status.clone()));
        }
        let fields = payload
            .as_object()
            .ok_or_else(|| DecodeError::Shape(payload.to_string()))?;
        OngoingStatus::from_fields(fields).map(Self::Ongoing)
    }
}

impl OngoingStatus {
    fn from_fields(fields: &Map<String, Value>) -> Result<Self, DecodeError> {
        let required = |name: &'static str| fields.get(name).ok_or(DecodeError::MissingField(name));
        let optional = |name: &str| fields.get(name).filter(|v| !v.is_null()).cloned();

        let track = as_u64("track", required("track")?)?;
        let submitted = as_u64("submitted", required("submitted")?)?;

        Ok(Self {
            track: u16::try_from(track).map_err(|_| DecodeError::NotInteger {
                field: "track",
                value: track.to_string(),
            })?,
            origin: optional("origin").unwrap_or(Value::Null),
            proposal: Proposal::from_json(fields.get("proposal")),
            enactment: optional("enactment").unwrap_or(Value::Null),
            submitted: u32::try_from(submitted).map_err(|_| DecodeError::NotInteger {
                field: "submitted",
                value: submitted.to_string(),
            })?,
            submission_deposit: optional("submissionDeposit").unwrap_or(Value::Null),
            decision_deposit: optional("decisionDeposit"),
            deciding: optional("deciding"),
            tally: optional("tally").unwrap_or(Value::Null),
            in_queue: fields
                .get("inQueue")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            alarm: optional("alarm"),
        })
    }
}

/// Read an unsigned integer that may be encoded as a number or a decimal string.
pub fn as_u64(field: &'static str, value: &Value) -> Result<u64, DecodeError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.replace(',', "").parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| DecodeError::NotInteger {
        field,
        value: value.to_string(),
    })
}
