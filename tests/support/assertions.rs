//! Assertions over `coffer` process output.
//!
//! coffer prints only command results (values, key lists, JSON, raw
//! records) on stdout; status lines, warnings, device prompts and errors
//! go to stderr.

use std::process::Output;

/// The run exited 0; on failure the panic shows coffer's stderr.
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "coffer exited with {}:\n{}",
        output.status,
        stderr(output)
    );
}

/// The run exited non-zero, as every error reported by `main` does.
pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "coffer succeeded but was expected to fail, stdout:\n{}",
        stdout(output)
    );
}

/// Command result, e.g. the decrypted value printed by `get`.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Status, warning and error lines.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(out.contains(expected), "stdout lacks {:?}:\n{}", expected, out);
}

/// E.g. `added KEY`, `key not found: KEY` or a `→` hint.
pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(err.contains(expected), "stderr lacks {:?}:\n{}", expected, err);
}

/// Used to check that secrets never reach stdout, e.g. with `--no-decrypt`.
pub fn assert_stdout_excludes(output: &Output, excluded: &str) {
    let out = stdout(output);
    assert!(!out.contains(excluded), "stdout leaks {:?}:\n{}", excluded, out);
}
