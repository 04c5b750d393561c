//! Hardware device capability.
//!
//! [`Transport`] enumerates devices and opens sessions; a [`Session`]
//! performs the device's CipherKeyValue wrap/unwrap. [`HardwareEncoder`]
//! turns any transport into an [`Encoder`]:
//!
//! 1. enumerate, fail with `DeviceError::NotFound` if nothing is plugged in
//! 2. pick the first device
//! 3. open a session, run exactly one call, close the session
//!
//! Sessions are never reused across calls because the device tracks
//! confirmation state per session. Calls block until the user confirms on
//! the device or the transport reports a failure.

use std::fmt::Display;

use tracing::{debug, trace};

use super::{check_payload, Encoder};
use crate::core::constants::DEFAULT_BIP32_PATH;
use crate::error::{DeviceError, Result};

/// Which directions ask the user for confirmation on the device.
///
/// Both flags are mixed into the device's key derivation, so a payload
/// wrapped with one policy can only be unwrapped with the same policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirm {
    pub on_encrypt: bool,
    pub on_decrypt: bool,
}

impl Confirm {
    /// Confirmation required in both directions.
    pub const ALWAYS: Self = Self {
        on_encrypt: true,
        on_decrypt: true,
    };
}

/// Device discovery and session factory.
pub trait Transport {
    /// Opaque identifier of an enumerated device.
    type Handle: Display;

    /// Session type returned by [`Transport::open`].
    type Session: Session;

    /// List connected devices.
    fn enumerate(&self) -> Result<Vec<Self::Handle>>;

    /// Open a session on one device.
    fn open(&self, handle: &Self::Handle) -> Result<Self::Session>;
}

/// One open conversation with a device.
pub trait Session {
    /// Encrypt `plaintext` under (`path`, `label`).
    fn wrap(&mut self, path: &str, label: &str, plaintext: &[u8], confirm: Confirm)
        -> Result<Vec<u8>>;

    /// Decrypt `ciphertext` under (`path`, `label`).
    fn unwrap(
        &mut self,
        path: &str,
        label: &str,
        ciphertext: &[u8],
        confirm: Confirm,
    ) -> Result<Vec<u8>>;

    /// Release the device.
    fn close(self) -> Result<()>;
}

/// Encoder backed by a physical device.
#[derive(Debug)]
pub struct HardwareEncoder<T> {
    transport: T,
    path: String,
    confirm: Confirm,
}

impl<T: Transport> HardwareEncoder<T> {
    /// Create an encoder using `path` as the BIP-32 derivation path.
    pub fn new(transport: T, path: &str) -> Self {
        Self {
            transport,
            path: path.to_string(),
            confirm: Confirm::ALWAYS,
        }
    }

    /// Create an encoder on the default path `m/10016'/0`.
    pub fn with_default_path(transport: T) -> Self {
        Self::new(transport, DEFAULT_BIP32_PATH)
    }

    /// Run `op` inside a fresh session on the first enumerated device.
    ///
    /// The session is closed even when `op` fails; the first error wins.
    fn with_session<R>(&self, op: impl FnOnce(&mut T::Session) -> Result<R>) -> Result<R> {
        let handle = self
            .transport
            .enumerate()?
            .into_iter()
            .next()
            .ok_or(DeviceError::NotFound)?;

        debug!(device = %handle, "opening device session");
        let mut session = self.transport.open(&handle)?;
        let result = op(&mut session);
        let closed = session.close();
        trace!(device = %handle, "device session closed");

        let value = result?;
        closed?;
        Ok(value)
    }
}

/// The device returns exactly as many bytes as it was given.
fn expect_same_len(sent: usize, received: Vec<u8>) -> Result<Vec<u8>> {
    if received.len() != sent {
        return Err(DeviceError::UnexpectedResponse(format!(
            "sent {} bytes, received {}",
            sent,
            received.len()
        ))
        .into());
    }
    Ok(received)
}

impl<T: Transport> Encoder for HardwareEncoder<T> {
    fn wrap(&self, label: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_payload(plaintext)?;
        let out = self.with_session(|s| s.wrap(&self.path, label, plaintext, self.confirm))?;
        expect_same_len(plaintext.len(), out)
    }

    fn unwrap(&self, label: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_payload(ciphertext)?;
        let out = self.with_session(|s| s.unwrap(&self.path, label, ciphertext, self.confirm))?;
        expect_same_len(ciphertext.len(), out)
    }

    fn name(&self) -> &'static str {
        "hardware"
    }

    fn confirms_on_device(&self) -> bool {
        self.confirm.on_encrypt || self.confirm.on_decrypt
    }
}
