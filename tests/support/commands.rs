//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a coffer command bound to this environment.
    ///
    /// Returns a Command configured with:
    /// - COFFER_CONFIG pointing at the test config
    /// - HOME set to the temporary home directory
    /// - Current directory set to the test working directory
    /// - colors disabled
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("coffer").expect("failed to find coffer binary");
        cmd.env("COFFER_CONFIG", self.config_path());
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("COFFER_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// `coffer put KEY --yes` with the value piped on stdin.
    pub fn put(&self, key: &str, value: &str) -> Output {
        self.cmd()
            .args(["put", key, "--yes"])
            .write_stdin(format!("{}\n", value))
            .output()
            .expect("failed to run coffer put")
    }

    /// `coffer get KEY`.
    pub fn get(&self, key: &str) -> Output {
        self.cmd()
            .args(["get", key])
            .output()
            .expect("failed to run coffer get")
    }

    /// `coffer get KEY --no-decrypt`.
    pub fn get_raw(&self, key: &str) -> Output {
        self.cmd()
            .args(["get", key, "--no-decrypt"])
            .output()
            .expect("failed to run coffer get --no-decrypt")
    }

    /// `coffer rm KEY --yes`.
    pub fn rm(&self, key: &str) -> Output {
        self.cmd()
            .args(["rm", key, "--yes"])
            .output()
            .expect("failed to run coffer rm")
    }

    /// `coffer list`.
    pub fn list(&self) -> Output {
        self.cmd()
            .arg("list")
            .output()
            .expect("failed to run coffer list")
    }

    /// `coffer list --json`.
    pub fn list_json(&self) -> Output {
        self.cmd()
            .args(["list", "--json"])
            .output()
            .expect("failed to run coffer list --json")
    }

    /// Run the shell with `lines` on stdin.
    pub fn shell(&self, lines: &[&str]) -> Output {
        let mut script = lines.join("\n");
        script.push('\n');
        self.cmd()
            .args(["shell", "--yes"])
            .write_stdin(script)
            .output()
            .expect("failed to run coffer shell")
    }
}
