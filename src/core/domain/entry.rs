//! Entry record type.
//!
//! Represents one stored secret: the device-wrapped nonce and the value
//! sealed under that nonce, both hex encoded.

use serde::{Deserialize, Serialize};

use crate::core::types::HexString;

/// One encrypted entry as stored in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Hex of the device-wrapped 32-byte item nonce.
    #[serde(rename = "nonce")]
    pub wrapped_nonce: HexString,
    /// Hex of `IV ∥ TAG ∥ CIPHERTEXT`, keyed by the unwrapped nonce.
    #[serde(rename = "value")]
    pub ciphertext: HexString,
}

impl EntryRecord {
    /// Create a record from raw bytes.
    pub fn from_bytes(wrapped_nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            wrapped_nonce: hex::encode(wrapped_nonce),
            ciphertext: hex::encode(ciphertext),
        }
    }
}

impl std::fmt::Display for EntryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nonce: {}\nvalue: {}", self.wrapped_nonce, self.ciphertext)
    }
}
