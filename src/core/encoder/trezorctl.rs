//! Trezor transport via the `trezorctl` CLI.
//!
//! Drives the vendor command-line tool rather than speaking the USB wire
//! protocol directly.
//!
//! ## Requirements
//!
//! - `trezorctl` must be installed (`pip install trezor`)
//! - exactly one Trezor should be connected; the first listed is used
//!
//! Each call spawns one `trezorctl` process, which claims the device, runs
//! one CipherKeyValue request and releases the device on exit. PIN and
//! passphrase entry happen on the user's terminal, so stdin and stderr are
//! inherited; only stdout (the hex result) is captured.
//!
//! ## Limitations
//!
//! `trezorctl` only takes the payload as a command-line argument. On a
//! wrap that payload is a fresh item nonce in the clear, which is the AES
//! key of the entry being written. While the process waits for the user to
//! confirm on the device, any local user who can read its argv (for
//! example `/proc/<pid>/cmdline` on Linux) can read that key. Unwraps and
//! the master-key derivation only pass wrapped or public data. Use this
//! transport on single-user machines only.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use super::device::{Confirm, Session, Transport};
use crate::error::{DeviceError, Result};

/// Transport spawning `trezorctl`.
///
/// Payloads travel as command-line arguments; see the module's limitations.
#[derive(Debug, Clone)]
pub struct Trezorctl {
    program: String,
}

impl Trezorctl {
    /// Use `program` (a name looked up in PATH, or a path).
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Locate the binary.
    fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.program)
            .map_err(|_| DeviceError::ToolMissing(self.program.clone()).into())
    }
}

/// Run `program args...`, returning trimmed stdout.
fn run(program: &Path, args: &[String]) -> Result<String> {
    trace!(program = %program.display(), ?args, "spawning");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| DeviceError::Transport(format!("failed to spawn {}: {}", program.display(), e)))?;

    if !output.status.success() {
        return Err(DeviceError::Transport(format!(
            "{} exited with {}",
            program.display(),
            output.status
        ))
        .into());
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| DeviceError::UnexpectedResponse(format!("UTF-8 error: {}", e)))?;
    Ok(stdout.trim().to_string())
}

/// Parse `trezorctl list` output into device paths.
///
/// Each device line starts with its transport path (`webusb:001:1`,
/// `hid:/dev/hidraw0`, `udp:127.0.0.1:21324`, ...); anything else is noise.
pub(crate) fn parse_device_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|token| token.contains(':'))
        .map(str::to_string)
        .collect()
}

/// The result line of a CipherKeyValue call; prompts may precede it.
fn last_line(stdout: &str) -> &str {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("")
}

/// Arguments for one CipherKeyValue call.
///
/// The hex payload is the last argument, visible in the process list for
/// the lifetime of the call.
pub(crate) fn keyvalue_args(
    device: &str,
    command: &str,
    path: &str,
    label: &str,
    payload: &[u8],
    confirm: Confirm,
) -> Vec<String> {
    let mut args = vec![
        "-p".to_string(),
        device.to_string(),
        "crypto".to_string(),
        command.to_string(),
        "-n".to_string(),
        path.to_string(),
    ];
    if confirm.on_encrypt {
        args.push("--prompt-on-encrypt".to_string());
    }
    if confirm.on_decrypt {
        args.push("--prompt-on-decrypt".to_string());
    }
    args.push(label.to_string());
    args.push(hex::encode(payload));
    args
}

impl Transport for Trezorctl {
    type Handle = String;
    type Session = TrezorctlSession;

    fn enumerate(&self) -> Result<Vec<String>> {
        let program = self.resolve()?;
        let devices = parse_device_list(&run(&program, &["list".to_string()])?);
        debug!(count = devices.len(), "enumerated devices");
        Ok(devices)
    }

    fn open(&self, handle: &String) -> Result<TrezorctlSession> {
        Ok(TrezorctlSession {
            program: self.resolve()?,
            device: handle.clone(),
        })
    }
}

/// Session bound to one device path.
#[derive(Debug)]
pub struct TrezorctlSession {
    program: PathBuf,
    device: String,
}

impl TrezorctlSession {
    fn call(
        &self,
        command: &str,
        path: &str,
        label: &str,
        payload: &[u8],
        confirm: Confirm,
    ) -> Result<Vec<u8>> {
        let args = keyvalue_args(&self.device, command, path, label, payload, confirm);
        let stdout = run(&self.program, &args)?;
        let result = last_line(&stdout);
        hex::decode(result).map_err(|e| {
            DeviceError::UnexpectedResponse(format!("{} output is not hex: {}", command, e)).into()
        })
    }
}

impl Session for TrezorctlSession {
    fn wrap(
        &mut self,
        path: &str,
        label: &str,
        plaintext: &[u8],
        confirm: Confirm,
    ) -> Result<Vec<u8>> {
        self.call("encrypt-keyvalue", path, label, plaintext, confirm)
    }

    fn unwrap(
        &mut self,
        path: &str,
        label: &str,
        ciphertext: &[u8],
        confirm: Confirm,
    ) -> Result<Vec<u8>> {
        self.call("decrypt-keyvalue", path, label, ciphertext, confirm)
    }

    fn close(self) -> Result<()> {
        // the spawned process already released the device
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_device_list() {
        let out = "webusb:001:1 - Trezor T 'My Trezor'\n\nhid:/dev/hidraw0\n";
        assert_eq!(parse_device_list(out), ["webusb:001:1", "hid:/dev/hidraw0"]);
    }

    #[test]
    fn test_parse_device_list_ignores_noise() {
        assert!(parse_device_list("").is_empty());
        assert!(parse_device_list("No devices found\n").is_empty());
    }

    #[test]
    fn test_last_line_skips_prompts() {
        assert_eq!(last_line("Please confirm the action on your Trezor device\nabcd\n\n"), "abcd");
        assert_eq!(last_line(""), "");
    }

    #[test]
    fn test_keyvalue_args() {
        let args = keyvalue_args(
            "webusb:001:1",
            "encrypt-keyvalue",
            "m/10016'/0",
            "Decrypt key login?",
            &[0xab, 0xcd],
            Confirm::ALWAYS,
        );
        assert_eq!(
            args,
            [
                "-p",
                "webusb:001:1",
                "crypto",
                "encrypt-keyvalue",
                "-n",
                "m/10016'/0",
                "--prompt-on-encrypt",
                "--prompt-on-decrypt",
                "Decrypt key login?",
                "abcd",
            ]
        );
    }

    #[test]
    fn test_keyvalue_args_without_prompts() {
        let confirm = Confirm {
            on_encrypt: false,
            on_decrypt: false,
        };
        let args = keyvalue_args("d", "decrypt-keyvalue", "m/0", "l", &[1], confirm);
        assert!(!args.iter().any(|a| a.starts_with("--prompt")));
        assert_eq!(args.last().map(String::as_str), Some("01"));
    }

    #[test]
    fn test_missing_program() {
        let transport = Trezorctl::new("coffer-no-such-trezorctl-binary");
        let err = transport.enumerate().unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::ToolMissing(_))));
    }
}
