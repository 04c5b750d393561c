//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success
//! - Red: errors
//! - Yellow: warnings, device prompts
//! - Cyan: paths, keys, hints
//! - Dimmed: secondary info
//!
//! Anything that is not the command's actual result goes to stderr, so
//! `coffer get KEY | ...` only ever pipes the value.

use console::style;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ added login`
pub fn success(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✓").green(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
///
/// Example: `✗ key not found: login`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
pub fn warn(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("⚠").yellow(), msg);
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ plug in your Trezor and unlock it`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Ask the user to look at the device.
pub fn device(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("⎆").yellow(), style(msg).bold());
    } else {
        eprintln!("⎆ {}", msg);
    }
}

/// Print a dimmed/secondary message.
///
/// Example: `no secrets stored`
pub fn dimmed(msg: &str) {
    if colors_enabled() {
        eprintln!("{}", style(msg).dim());
    } else {
        eprintln!("{}", msg);
    }
}

/// Format a key name in cyan.
pub fn key(k: &str) -> String {
    if colors_enabled() {
        style(k).cyan().to_string()
    } else {
        k.to_string()
    }
}

/// Format a path in cyan.
pub fn path(p: &std::path::Path) -> String {
    let p = p.display().to_string();
    if colors_enabled() {
        style(p).cyan().to_string()
    } else {
        p
    }
}
