//! Software stand-in encoder.
//!
//! XORs the payload with a SHA-256 keystream derived from a fixed seed and
//! the label. Reversible, length-preserving and deterministic, which is all
//! the store needs from an encoder. It is NOT secure: anyone who knows the
//! seed can unwrap every nonce.

use sha2::{Digest, Sha256};
use tracing::trace;

use super::{check_payload, Encoder};
use crate::error::Result;

const DEFAULT_SEED: &[u8] = b"coffer-software-encoder";

/// Deterministic, non-secure encoder for tests and demos.
#[derive(Clone)]
pub struct SoftwareEncoder {
    seed: Vec<u8>,
}

impl SoftwareEncoder {
    /// Create an encoder with a custom seed.
    ///
    /// Two encoders with different seeds behave like two different devices.
    pub fn new(seed: &[u8]) -> Self {
        Self {
            seed: seed.to_vec(),
        }
    }

    fn transform(&self, label: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        for (counter, chunk) in data.chunks(32).enumerate() {
            let mut hasher = Sha256::new();
            hasher.update((self.seed.len() as u64).to_be_bytes());
            hasher.update(&self.seed);
            hasher.update((label.len() as u64).to_be_bytes());
            hasher.update(label.as_bytes());
            hasher.update((counter as u64).to_be_bytes());
            let block = hasher.finalize();
            out.extend(chunk.iter().zip(block.iter()).map(|(d, k)| d ^ k));
        }
        out
    }
}

impl Default for SoftwareEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl std::fmt::Debug for SoftwareEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareEncoder")
            .field("seed", &"<redacted>")
            .finish()
    }
}

impl Encoder for SoftwareEncoder {
    fn wrap(&self, label: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_payload(plaintext)?;
        trace!(label, len = plaintext.len(), "software wrap");
        Ok(self.transform(label, plaintext))
    }

    fn unwrap(&self, label: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_payload(ciphertext)?;
        trace!(label, len = ciphertext.len(), "software unwrap");
        Ok(self.transform(label, ciphertext))
    }

    fn name(&self) -> &'static str {
        "software"
    }
}
