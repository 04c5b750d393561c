//! AES-256-GCM sealing in the `IV ∥ TAG ∥ CIPHERTEXT` layout.
//!
//! Used both for the whole document (keyed by the master key) and for each
//! entry value (keyed by the entry's unwrapped nonce).

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use tracing::trace;

use crate::core::constants::{IV_LEN, KEY_LEN, TAG_LEN};
use crate::error::{Error, Result};

/// Smallest valid sealed blob: IV and tag around an empty ciphertext.
pub const MIN_SEALED_LEN: usize = IV_LEN + TAG_LEN;

/// Why a sealed blob could not be opened.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    #[error("sealed data is {0} bytes, shorter than the 28-byte header")]
    TooShort(usize),

    #[error("authentication tag mismatch")]
    Tag,
}

/// Fill a buffer with bytes from the OS RNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// Returns `IV(12) ∥ TAG(16) ∥ CIPHERTEXT`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let iv: [u8; IV_LEN] = random_bytes();

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(MIN_SEALED_LEN + buffer.len());
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&tag);
    sealed.extend_from_slice(&buffer);

    trace!(plaintext_len = plaintext.len(), sealed_len = sealed.len(), "sealed");
    Ok(sealed)
}

/// Decrypt a blob produced by [`seal`].
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> std::result::Result<Vec<u8>, OpenError> {
    if sealed.len() < MIN_SEALED_LEN {
        return Err(OpenError::TooShort(sealed.len()));
    }

    let (iv, rest) = sealed.split_at(IV_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| OpenError::Tag)?;

    trace!(sealed_len = sealed.len(), plaintext_len = buffer.len(), "opened");
    Ok(buffer)
}
