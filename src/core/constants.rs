//! Constants used throughout coffer.
//!
//! Centralizes magic strings, sizes and the fixed master-key inputs.

/// Format version written into every document.
pub const STORE_VERSION: &str = "1";

/// AES-GCM initialization vector length.
pub const IV_LEN: usize = 12;

/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// AES-256 key length, also the size of the master key and item nonces.
pub const KEY_LEN: usize = 32;

/// Per-entry nonce size.
pub const ITEM_NONCE_LEN: usize = KEY_LEN;

/// Device label used to derive the master key.
///
/// Changing it (or [`MASTER_SEED`]) makes every existing store unreadable.
pub const MASTER_LABEL: &str = "Decrypt coffer file?";

/// Constant wrapped by the device to derive the master key.
pub const MASTER_SEED: [u8; KEY_LEN] = [
    0x8d, 0x58, 0xd4, 0xab, 0xac, 0x74, 0x12, 0x39, 0x3d, 0x55, 0xce, 0xe2, 0x62, 0x93, 0x18, 0x80,
    0x4f, 0x1e, 0xa7, 0x06, 0xc2, 0x9b, 0x33, 0x70, 0xe5, 0x0d, 0x8a, 0x61, 0xfc, 0x27, 0xb4, 0x59,
];

/// Device payloads must be a multiple of this block size.
pub const DEVICE_BLOCK_LEN: usize = 16;

/// Largest payload the device accepts in one call.
pub const DEVICE_MAX_PAYLOAD: usize = 1024;

/// Default BIP-32 path used for CipherKeyValue.
pub const DEFAULT_BIP32_PATH: &str = "m/10016'/0";

/// Default vendor CLI driving the device.
pub const DEFAULT_DEVICE_PROGRAM: &str = "trezorctl";

/// Environment variable pointing at an alternate config file.
pub const CONFIG_ENV: &str = "COFFER_CONFIG";

/// Environment variable controlling log filtering.
pub const LOG_ENV: &str = "COFFER_LOG";

/// Config file location relative to the platform config dir.
pub const CONFIG_FILE: &str = "coffer/config.toml";
