//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a coffer command for this environment.
    ///
    /// Returns a Command configured with:
    /// - COFFER_CONFIG pointing at the temp config
    /// - NO_COLOR set so output can be matched literally
    /// - Current directory set to the temp dir
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("coffer").expect("failed to find coffer binary");
        cmd.env("COFFER_CONFIG", self.config_path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("COFFER_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run `coffer` with `args`.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run coffer")
    }

    /// Shortcut for `coffer set` command.
    pub fn set(&self, key: &str, val: &str) -> Output {
        self.run(&["set", key, val])
    }

    /// Shortcut for `coffer get` command.
    pub fn get(&self, key: &str) -> Output {
        self.run(&["get", key])
    }

    /// Shortcut for `coffer rm` command.
    pub fn rm(&self, key: &str) -> Output {
        self.run(&["rm", key])
    }

    /// Shortcut for `coffer list --json`, parsed.
    pub fn list_json(&self) -> serde_json::Value {
        let output = self.run(&["list", "--json"]);
        super::assert_success(&output);
        serde_json::from_slice(&output.stdout).expect("list --json is not JSON")
    }

    /// Shortcut for `coffer contains` command.
    pub fn contains(&self, key: &str) -> Output {
        self.run(&["contains", key])
    }
}
