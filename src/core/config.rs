//! Configuration file management.
//!
//! Reads and validates the optional `config.toml`. Every field has a
//! default, so a missing file means "hardware encoder, default path".
//!
//! ```toml
//! file = "/home/me/secrets.coffer"
//!
//! [encoder]
//! kind = "hardware"        # or "software"
//! allow_insecure = false   # required for "software"
//! seed = "demo"            # software encoder only
//!
//! [device]
//! program = "trezorctl"
//! path = "m/10016'/0"
//! ```

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants::{CONFIG_ENV, CONFIG_FILE, DEFAULT_BIP32_PATH, DEFAULT_DEVICE_PROGRAM};
use crate::error::{ConfigError, Result};

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store file used when `--file` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub encoder: EncoderConfig,
    pub device: DeviceConfig,
}

/// Which encoder backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    #[default]
    Hardware,
    Software,
}

/// `[encoder]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub kind: EncoderKind,
    /// Must be set to use the software encoder.
    pub allow_insecure: bool,
    /// Software encoder seed; stores are bound to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

/// `[device]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Vendor CLI, looked up in PATH unless absolute.
    pub program: String,
    /// BIP-32 path passed to CipherKeyValue.
    pub path: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_DEVICE_PROGRAM.to_string(),
            path: DEFAULT_BIP32_PATH.to_string(),
        }
    }
}

/// Where the config is read from and whether it must exist.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Required(PathBuf),
    Optional(PathBuf),
    None,
}

/// Pick the config source: explicit flag, then `$COFFER_CONFIG`, then the
/// platform config dir.
fn resolve(explicit: Option<&Path>, env: Option<OsString>, config_dir: Option<PathBuf>) -> Source {
    if let Some(path) = explicit {
        return Source::Required(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return Source::Required(PathBuf::from(path));
    }
    match config_dir {
        Some(dir) => Source::Optional(dir.join(CONFIG_FILE)),
        None => Source::None,
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path or `$COFFER_CONFIG` must point at a readable file;
    /// the default location may be absent, in which case defaults apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile`, `ConfigError::Parse` or a
    /// validation error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let source = resolve(explicit, std::env::var_os(CONFIG_ENV), dirs::config_dir());
        let path = match source {
            Source::Required(path) => path,
            Source::Optional(path) if path.exists() => path,
            Source::Optional(_) | Source::None => {
                debug!("no config file, using defaults");
                return Ok(Self::default());
            }
        };

        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        debug!(encoder = ?config.encoder.kind, "config loaded");
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureEncoder` when the software encoder is
    /// selected without `allow_insecure`, or `ConfigError::InvalidValue`
    /// for empty device settings.
    pub fn validate(&self) -> Result<()> {
        if self.encoder.kind == EncoderKind::Software && !self.encoder.allow_insecure {
            return Err(ConfigError::InsecureEncoder.into());
        }
        if self.device.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "device.program",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        if !self.device.path.starts_with('m') {
            return Err(ConfigError::InvalidValue {
                field: "device.path",
                reason: format!("not a BIP-32 path: {:?}", self.device.path),
            }
            .into());
        }
        if matches!(&self.file, Some(f) if f.as_os_str().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "file",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.encoder.kind, EncoderKind::Hardware);
        assert!(!config.encoder.allow_insecure);
        assert_eq!(config.device.program, "trezorctl");
        assert_eq!(config.device.path, "m/10016'/0");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
file = "/tmp/store.coffer"

[encoder]
kind = "software"
allow_insecure = true
seed = "demo"

[device]
program = "/opt/trezor/bin/trezorctl"
path = "m/10016'/1"
"#,
        )
        .unwrap();
        assert_eq!(config.file, Some(PathBuf::from("/tmp/store.coffer")));
        assert_eq!(config.encoder.kind, EncoderKind::Software);
        assert_eq!(config.encoder.seed.as_deref(), Some("demo"));
        assert_eq!(config.device.path, "m/10016'/1");
    }

    #[test]
    fn test_software_without_opt_in_rejected() {
        let err = Config::from_toml("[encoder]\nkind = \"software\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InsecureEncoder)));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = Config::from_toml("[encoder]\nkind = \"ledger\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_toml("colour = true\n").is_err());
    }

    #[test]
    fn test_invalid_device_values() {
        let err = Config::from_toml("[device]\nprogram = \" \"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "device.program", .. })
        ));

        let err = Config::from_toml("[device]\npath = \"10016/0\"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "device.path", .. })
        ));
    }

    #[test]
    fn test_resolve_order() {
        let explicit = PathBuf::from("/a/config.toml");
        assert_eq!(
            resolve(Some(explicit.as_path()), Some("/b".into()), Some("/c".into())),
            Source::Required(explicit)
        );
        assert_eq!(
            resolve(None, Some("/b".into()), Some("/c".into())),
            Source::Required(PathBuf::from("/b"))
        );
        assert_eq!(
            resolve(None, Some("".into()), Some("/c".into())),
            Source::Optional(PathBuf::from("/c/coffer/config.toml"))
        );
        assert_eq!(resolve(None, None, None), Source::None);
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[encoder]\nkind = \"software\"\nallow_insecure = true\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.encoder.kind, EncoderKind::Software);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load(Some(tmp.path().join("nope.toml").as_path())).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
    }
}
