//! Master key derivation.
//!
//! The document key is never stored: it is the device's wrap of a fixed
//! constant under a fixed label, so it can be recomputed on every open by
//! the same device and by no other.

use tracing::debug;
use zeroize::Zeroizing;

use super::encoder::Encoder;
use crate::core::constants::{KEY_LEN, MASTER_LABEL, MASTER_SEED};
use crate::core::types::SymmetricKey;
use crate::error::{DeviceError, Result};

/// Ask the encoder for the store's master key.
///
/// Costs exactly one device call (and one user confirmation).
///
/// # Errors
///
/// Propagates encoder errors; returns `DeviceError::UnexpectedResponse`
/// if the result is not exactly 32 bytes.
pub fn derive_master_key<E: Encoder + ?Sized>(encoder: &E) -> Result<SymmetricKey> {
    debug!(encoder = encoder.name(), "deriving master key");
    let wrapped = Zeroizing::new(encoder.wrap(MASTER_LABEL, &MASTER_SEED)?);

    let bytes: [u8; KEY_LEN] = wrapped.as_slice().try_into().map_err(|_| {
        DeviceError::UnexpectedResponse(format!(
            "master key must be {} bytes, got {}",
            KEY_LEN,
            wrapped.len()
        ))
    })?;
    Ok(Zeroizing::new(bytes))
}
