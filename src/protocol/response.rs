//! Response definitions
//!
//! Represents responses to clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
    BadRequest = 0x03,
    TooLarge = 0x04,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Status::Ok,
            0x01 => Status::NotFound,
            0x02 => Status::Error,
            0x03 => Status::BadRequest,
            0x04 => Status::TooLarge,
            _ => return None,
        })
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value, encoded reply, or error message)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK response carrying a bincode-encoded reply
    pub fn ok_encoded<T: Serialize>(reply: &T) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(reply)?)))
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self::with_message(Status::Error, message)
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self::with_message(Status::BadRequest, message)
    }

    /// Create a TOO_LARGE response
    pub fn too_large(message: &str) -> Self {
        Self::with_message(Status::TooLarge, message)
    }

    /// Map an operation failure to its response
    pub fn from_error(error: &KvError) -> Self {
        match error {
            KvError::KeyNotFound => Self::not_found(),
            KvError::BadBatch(_) | KvError::Protocol(_) | KvError::AlreadyExists(_) => {
                Self::bad_request(&error.to_string())
            }
            KvError::Oversize { .. } | KvError::ReplyTooLarge { .. } => {
                Self::too_large(&error.to_string())
            }
            _ => Self::error(&error.to_string()),
        }
    }

    fn with_message(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Payload as text (error messages, properties)
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }

    /// Decode a bincode reply from the payload
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| KvError::Protocol("response has no payload".to_string()))?;
        Ok(bincode::deserialize(payload)?)
    }
}

// =============================================================================
// Reply Bodies
// =============================================================================

/// A key with its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Reply to MULTI_GET: only keys that were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiGetReply {
    pub data: Vec<KeyValue>,
}

/// One scanned item: a bare key when values were not requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanItem {
    Key(Vec<u8>),
    Pair(KeyValue),
}

impl ScanItem {
    pub fn key(&self) -> &[u8] {
        match self {
            ScanItem::Key(key) | ScanItem::Pair(KeyValue { key, .. }) => key,
        }
    }

    pub fn value(&self) -> Option<&[u8]> {
        match self {
            ScanItem::Key(_) => None,
            ScanItem::Pair(kv) => Some(&kv.value),
        }
    }
}

/// Reply to ITERATE
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterateReply {
    /// The scan stopped at its limit, or at the payload cap, before reaching
    /// its end bound
    pub more: bool,
    pub data: Vec<ScanItem>,
}
