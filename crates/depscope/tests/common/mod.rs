//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the compiled depscope binary
pub fn depscope_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_depscope"))
}

/// Directory holding the integration test fixtures
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Path of one fixture, as a string for use in arguments
pub fn fixture_path(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

/// Run depscope with colors off and no inherited registry or log settings
pub fn run_depscope(args: &[&str]) -> Output {
    Command::new(depscope_binary())
        .args(args)
        .env("NO_COLOR", "1")
        .env("DEPSCOPE_MAX_WIDTH", "100")
        .env_remove("DEPSCOPE_REGISTRY_URL")
        .env_remove("DEPSCOPE_ASCII")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute depscope binary")
}

/// Stdout of a run as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a run as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Run depscope with `--json` and parse stdout, asserting success
pub fn run_json(args: &[&str]) -> serde_json::Value {
    let mut all = args.to_vec();
    all.push("--json");
    let output = run_depscope(&all);
    assert!(
        output.status.success(),
        "depscope failed: {}",
        stderr(&output)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be a single JSON object")
}
