//! Per-entry encryption.
//!
//! Each value gets its own random 32-byte nonce, used directly as the
//! AES-256-GCM key for that value. Only the nonce goes through the device,
//! wrapped under a label naming the entry, so the device prompt tells the
//! user which secret is about to be revealed.

use tracing::debug;
use zeroize::Zeroizing;

use super::cipher;
use super::domain::EntryRecord;
use super::encoder::Encoder;
use crate::core::constants::ITEM_NONCE_LEN;
use crate::error::{Error, Result};

/// Device label for an entry.
pub fn item_label(key: &str) -> String {
    format!("Decrypt key {}?", key)
}

/// Encrypt `value` for storage under `key`.
pub fn encrypt_item<E: Encoder + ?Sized>(
    encoder: &E,
    key: &str,
    value: &str,
) -> Result<EntryRecord> {
    let nonce = Zeroizing::new(cipher::random_bytes::<ITEM_NONCE_LEN>());
    let wrapped = encoder.wrap(&item_label(key), nonce.as_slice())?;
    let sealed = cipher::seal(&nonce, value.as_bytes())?;

    debug!(key, len = value.len(), "entry encrypted");
    Ok(EntryRecord::from_bytes(&wrapped, &sealed))
}

/// Decrypt the value stored under `key`.
///
/// # Errors
///
/// Returns `Error::CorruptEntry` for bad hex, a wrapped or unwrapped nonce
/// of the wrong size, a failed tag check or non-UTF-8 plaintext. Encoder
/// errors are propagated unchanged.
pub fn decrypt_item<E: Encoder + ?Sized>(
    encoder: &E,
    key: &str,
    record: &EntryRecord,
) -> Result<Zeroizing<String>> {
    let wrapped = hex::decode(&record.wrapped_nonce)
        .map_err(|_| Error::corrupt_entry(key, "nonce is not valid hexadecimal"))?;
    let sealed = hex::decode(&record.ciphertext)
        .map_err(|_| Error::corrupt_entry(key, "value is not valid hexadecimal"))?;

    if wrapped.len() != ITEM_NONCE_LEN {
        return Err(Error::corrupt_entry(
            key,
            format!("wrapped nonce is {} bytes, expected {}", wrapped.len(), ITEM_NONCE_LEN),
        ));
    }

    let unwrapped = Zeroizing::new(encoder.unwrap(&item_label(key), &wrapped)?);
    let nonce: Zeroizing<[u8; ITEM_NONCE_LEN]> = Zeroizing::new(
        unwrapped
            .as_slice()
            .try_into()
            .map_err(|_| Error::corrupt_entry(key, "unwrapped nonce has the wrong size"))?,
    );

    let plaintext =
        cipher::open(&nonce, &sealed).map_err(|e| Error::corrupt_entry(key, e.to_string()))?;
    let value = String::from_utf8(plaintext)
        .map_err(|_| Error::corrupt_entry(key, "value is not valid UTF-8"))?;

    debug!(key, "entry decrypted");
    Ok(Zeroizing::new(value))
}
