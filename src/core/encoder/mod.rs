//! Wrap/unwrap encoders.
//!
//! An encoder is the only component that talks to the confidentiality root.
//! It can wrap and unwrap small, fixed-size payloads under a label; the
//! store never hands it anything larger than a 32-byte key.
//!
//! ## Backends
//!
//! - **hardware**: default. Drives a connected Trezor through a
//!   [`device::Transport`]; every call asks for confirmation on the device.
//! - **software**: deterministic, NOT secure. Exists so the store can be
//!   exercised without hardware. Requires `allow_insecure` in the config.
//!
//! The backend is picked once, from configuration, by
//! [`EncoderBackend::from_config`] and then passed to the store.

use tracing::debug;

use crate::core::config::{Config, EncoderKind};
use crate::core::constants::{DEVICE_BLOCK_LEN, DEVICE_MAX_PAYLOAD};
use crate::error::{ConfigError, DeviceError, Result};

pub mod device;
mod software;
mod trezorctl;

pub use device::{Confirm, HardwareEncoder, Session, Transport};
pub use software::SoftwareEncoder;
pub use trezorctl::{Trezorctl, TrezorctlSession};

/// Bounded wrap/unwrap capability.
///
/// Implementations must be deterministic for a given label: unwrapping the
/// output of `wrap(label, x)` under the same label yields `x`.
pub trait Encoder {
    /// Wrap a small payload under `label`.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::InvalidPayload` if the payload is out of
    /// bounds, or any device/transport error.
    fn wrap(&self, label: &str, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Unwrap a payload previously produced by [`Encoder::wrap`].
    fn unwrap(&self, label: &str, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;

    /// Whether each call waits for the user to confirm on a device.
    fn confirms_on_device(&self) -> bool {
        false
    }
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn wrap(&self, label: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        (**self).wrap(label, plaintext)
    }

    fn unwrap(&self, label: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        (**self).unwrap(label, ciphertext)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn confirms_on_device(&self) -> bool {
        (**self).confirms_on_device()
    }
}

/// Check a payload against the device's CipherKeyValue limits.
pub fn check_payload(payload: &[u8]) -> Result<()> {
    let len = payload.len();
    if len == 0 || len > DEVICE_MAX_PAYLOAD || len % DEVICE_BLOCK_LEN != 0 {
        return Err(DeviceError::InvalidPayload {
            len,
            max: DEVICE_MAX_PAYLOAD,
            block: DEVICE_BLOCK_LEN,
        }
        .into());
    }
    Ok(())
}

/// Encoder selected from configuration.
#[derive(Debug)]
pub enum EncoderBackend {
    /// Trezor driven through `trezorctl`.
    Hardware(HardwareEncoder<Trezorctl>),

    /// Deterministic stand-in for tests and demos.
    Software(SoftwareEncoder),
}

impl EncoderBackend {
    /// Create an encoder backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureEncoder` if the software encoder is
    /// selected without `allow_insecure`.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.encoder.kind {
            EncoderKind::Hardware => {
                debug!(
                    program = %config.device.program,
                    path = %config.device.path,
                    "creating hardware encoder"
                );
                let transport = Trezorctl::new(&config.device.program);
                Ok(Self::Hardware(HardwareEncoder::new(
                    transport,
                    &config.device.path,
                )))
            }
            EncoderKind::Software => {
                if !config.encoder.allow_insecure {
                    return Err(ConfigError::InsecureEncoder.into());
                }
                debug!("creating software encoder");
                let encoder = match &config.encoder.seed {
                    Some(seed) => SoftwareEncoder::new(seed.as_bytes()),
                    None => SoftwareEncoder::default(),
                };
                Ok(Self::Software(encoder))
            }
        }
    }

    /// True for backends that give no real protection.
    pub fn is_insecure(&self) -> bool {
        matches!(self, Self::Software(_))
    }
}

impl Encoder for EncoderBackend {
    fn wrap(&self, label: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Hardware(e) => e.wrap(label, plaintext),
            Self::Software(e) => e.wrap(label, plaintext),
        }
    }

    fn unwrap(&self, label: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Hardware(e) => e.unwrap(label, ciphertext),
            Self::Software(e) => e.unwrap(label, ciphertext),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Hardware(e) => e.name(),
            Self::Software(e) => e.name(),
        }
    }

    fn confirms_on_device(&self) -> bool {
        match self {
            Self::Hardware(e) => e.confirms_on_device(),
            Self::Software(e) => e.confirms_on_device(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_check_payload_bounds() {
        assert!(check_payload(&[0u8; 16]).is_ok());
        assert!(check_payload(&[0u8; 32]).is_ok());
        assert!(check_payload(&[0u8; 1024]).is_ok());

        for len in [0usize, 1, 15, 17, 31, 1040] {
            let err = check_payload(&vec![0u8; len]).unwrap_err();
            assert!(
                matches!(err, Error::Device(DeviceError::InvalidPayload { len: l, .. }) if l == len),
                "len {} should be rejected",
                len
            );
        }
    }

    #[test]
    fn test_hardware_from_default_config() {
        let backend = EncoderBackend::from_config(&Config::default()).unwrap();
        assert_eq!(backend.name(), "hardware");
        assert!(!backend.is_insecure());
        assert!(backend.confirms_on_device());
    }

    #[test]
    fn test_software_requires_allow_insecure() {
        let mut config = Config::default();
        config.encoder.kind = EncoderKind::Software;
        let err = EncoderBackend::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InsecureEncoder)));

        config.encoder.allow_insecure = true;
        let backend = EncoderBackend::from_config(&config).unwrap();
        assert_eq!(backend.name(), "software");
        assert!(backend.is_insecure());
        assert!(!backend.confirms_on_device());
    }

    #[test]
    fn test_software_seed_from_config() {
        let mut config = Config::default();
        config.encoder.kind = EncoderKind::Software;
        config.encoder.allow_insecure = true;
        config.encoder.seed = Some("alpha".to_string());
        let alpha = EncoderBackend::from_config(&config).unwrap();

        config.encoder.seed = Some("beta".to_string());
        let beta = EncoderBackend::from_config(&config).unwrap();

        let payload = [3u8; 32];
        assert_ne!(
            alpha.wrap("label", &payload).unwrap(),
            beta.wrap("label", &payload).unwrap()
        );
    }
}
