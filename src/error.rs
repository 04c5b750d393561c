//! Error types.
//!
//! One top-level [`Error`] with nested enums per concern, so callers can
//! match on exactly the failure they care about (a missing device, a
//! corrupt file, a tampered entry) without string inspection.

use thiserror::Error;

/// Errors raised while talking to the hardware device.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("no hardware device found, make sure it is plugged in")]
    NotFound,

    #[error("{0} not found in PATH, install it or set [device].program in the config")]
    ToolMissing(String),

    #[error("device payload must be 1..={max} bytes in blocks of {block}, got {len}")]
    InvalidPayload {
        len: usize,
        max: usize,
        block: usize,
    },

    #[error("device transport failed: {0}")]
    Transport(String),

    #[error("unexpected device response: {0}")]
    UnexpectedResponse(String),
}

/// Caller-level policy violations.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("key already exists: {0} (existing keys cannot be modified, delete it first)")]
    KeyExists(String),

    #[error("value for {0} cannot be empty")]
    EmptyValue(String),

    #[error("no store file given: pass --file or set `file` in the config")]
    NoStoreFile,

    #[error("store file {0} does not exist")]
    MissingStoreFile(String),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("the software encoder is not secure; set encoder.allow_insecure = true to use it")]
    InsecureEncoder,
}

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("the store file is corrupt or was encrypted with another device: {0}")]
    CorruptFile(String),

    #[error("entry {key} is corrupt: {reason}")]
    CorruptEntry { key: String, reason: String },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("the store is closed")]
    Closed,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::CorruptEntry`] for `key`.
    pub fn corrupt_entry(key: &str, reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True when no device was enumerated.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, Self::Device(DeviceError::NotFound))
    }

    /// True for filesystem permission failures.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
