//! Shared E2E test helpers for `siap` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Default timeout for basic CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Variables from the caller's shell that would leak into the run.
const ISOLATED_VARS: &[&str] = &[
    "RUST_LOG",
    "SIAP_DEBUG",
    "SIAP_VERBOSE",
    "SIAP_APP_ID",
    "SIAP_ROLE_MATCH",
];

/// A scratch installation: config, documents, blobs, accounts and session
/// all live under one temp directory.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir for sandbox"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Command for the `siap` binary bound to this sandbox.
    pub fn cmd(&self) -> assert_cmd::Command {
        let root = self.dir.path();
        let mut cmd: assert_cmd::Command = cargo_bin_cmd!("siap");
        cmd.timeout(TIMEOUT_BASIC);
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(root)
            .env("HOME", root)
            .env("SIAP_DATA_DIR", root.join("data"))
            .env("SIAP_BLOB_DIR", root.join("blobs"))
            .env("SIAP_ACCOUNTS_FILE", root.join("accounts.toml"))
            .env("SIAP_SESSION_FILE", root.join("session.json"));
        cmd
    }

    /// Creates an account with `role` and signs in as it.
    pub fn sign_in_as(&self, email: &str, role: &str) {
        self.cmd()
            .args(["account", "add", "--email", email, "--password", "pw", "--role", role])
            .assert()
            .success();
        self.cmd()
            .args(["login", "--email", email, "--password", "pw"])
            .assert()
            .success();
    }

    /// Signs out and in again as a freshly created account.
    pub fn switch_to(&self, email: &str, role: &str) {
        self.cmd().arg("logout").assert().success();
        self.sign_in_as(email, role);
    }

    pub fn session_json(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.path().join("session.json"))
            .expect("session file should exist");
        serde_json::from_str(&text).expect("session file should be JSON")
    }
}

/// Text of stdout from a finished assertion.
pub fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}
