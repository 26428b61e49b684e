//! Integration tests for the depscope CLI.
//!
//! These tests run the compiled binary against the fixtures in
//! `tests/fixtures/` and check both text and JSON output.

use rstest::{fixture, rstest};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{fixture_path, run_depscope, run_json, stderr, stdout};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run_depscope(&["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("depscope"));
    assert!(out.contains("Usage:"));
    assert!(out.contains("--test-repo"));
    assert!(out.contains("--reverse"));
}

#[test]
fn test_cli_version() {
    let output = run_depscope(&["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Forward Analysis
// ============================================================================

#[test]
fn test_forward_simple_text_output() {
    let output = run_depscope(&["-p", "A", "--test-repo", &fixture_path("simple_test.txt")]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Work mode:       offline"), "{out}");
    assert!(out.contains("Dependencies of A\nA\n├── B\n│   └── D\n└── C\n    ├── D (*)"), "{out}");
    assert!(out.contains("Packages:        6"), "{out}");
    assert!(out.contains("Cycle detected:  no"), "{out}");
    assert!(out.contains("Level 3: A"), "{out}");
}

#[test]
fn test_forward_simple_json() {
    let json = run_json(&["-p", "A", "--test-repo", &fixture_path("simple_test.txt")]);

    assert_eq!(json["root"], "A");
    assert_eq!(json["direction"], "forward");
    assert_eq!(
        json["edges"],
        json!({"A": ["B", "C"], "B": ["D"], "D": [], "C": ["D", "E"], "E": ["F"], "F": []})
    );
    assert_eq!(json["cycle_detected"], false);
    assert_eq!(json["levels"]["0"], json!(["D", "F"]));
    assert_eq!(json["levels"]["3"], json!(["A"]));
    assert_eq!(json["leaves"], json!(["D", "F"]));
}

#[rstest]
#[case::root_cycle("A", json!(["A", "B", "C", "A"]), json!({"A": ["B"], "B": ["C"], "C": []}))]
#[case::mutual_pair("D", json!(["D", "E", "D"]), json!({"D": ["E"], "E": ["F"], "F": []}))]
fn test_forward_cycles(
    #[case] root: &str,
    #[case] cycle: serde_json::Value,
    #[case] edges: serde_json::Value,
) {
    let json = run_json(&["-p", root, "--test-repo", &fixture_path("cycle_test.txt")]);

    assert_eq!(json["cycle_detected"], true);
    assert_eq!(json["cycles"], json!([cycle]));
    assert_eq!(json["edges"], edges);
}

#[test]
fn test_forward_cycle_text_lists_chain() {
    let output = run_depscope(&["-p", "A", "--test-repo", &fixture_path("cycle_test.txt")]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Cycle detected:  yes (1)"), "{out}");
    assert!(out.contains("Cycles (1)\n  A -> B -> C -> A"), "{out}");
    // C lost only its cycle-closing edge, so it stays above level 0.
    assert!(out.contains("  Level 1: C"), "{out}");
}

#[test]
fn test_forward_complex_levels() {
    let json = run_json(&["-p", "A", "--test-repo", &fixture_path("complex_test.txt")]);

    assert_eq!(json["statistics"]["packages"], 16);
    assert_eq!(json["statistics"]["edges"], 18);
    assert_eq!(json["levels"]["0"], json!(["M", "N", "O", "P"]));
    assert_eq!(json["levels"]["2"], json!(["E", "F", "G", "H"]));
    assert_eq!(json["levels"]["4"], json!(["A"]));
}

#[test]
fn test_forward_max_depth() {
    let json = run_json(&[
        "-p",
        "A",
        "--test-repo",
        &fixture_path("complex_test.txt"),
        "--max-depth",
        "2",
    ]);

    let keys: Vec<&str> = json["edges"]
        .as_object()
        .expect("edges is an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 4);
    for key in ["A", "B", "C", "D"] {
        assert!(keys.contains(&key), "missing {key} in {keys:?}");
    }
    // Pruned children stay listed under their parent.
    assert_eq!(json["edges"]["B"], json!(["E", "F"]));
    assert_eq!(json["statistics"]["max_depth"], 2);
}

#[test]
fn test_forward_filter_and_exclude() {
    let json = run_json(&[
        "-p",
        "Contoso.App",
        "--test-repo",
        &fixture_path("nuspec"),
        "--filter",
        "contoso",
    ]);
    assert_eq!(
        json["edges"],
        json!({"Contoso.App": ["Microsoft.Extensions.Logging", "Newtonsoft.Json"]})
    );

    let json = run_json(&[
        "-p",
        "Contoso.App",
        "--test-repo",
        &fixture_path("nuspec"),
        "--exclude",
        "options",
    ]);
    let edges = json["edges"].as_object().expect("edges is an object");
    assert!(!edges.contains_key("Microsoft.Extensions.Options"));
    assert!(edges.contains_key("Microsoft.Extensions.DependencyInjection"));
}

#[test]
fn test_forward_nuspec_directory() {
    let json = run_json(&["-p", "Contoso.App", "--test-repo", &fixture_path("nuspec")]);

    assert_eq!(
        json["edges"]["Microsoft.Extensions.Logging"],
        json!([
            "Microsoft.Extensions.DependencyInjection",
            "Microsoft.Extensions.Options"
        ])
    );
    assert_eq!(json["edges"]["Newtonsoft.Json"], json!([]));
    assert_eq!(json["statistics"]["packages"], 5);
    assert_eq!(json["levels"]["3"], json!(["Contoso.App"]));
}

#[rstest]
fn test_unknown_dependency_is_reported_not_fatal(temp_dir: TempDir) {
    let path = temp_dir.path().join("partial.txt");
    fs::write(&path, "A -> B Missing\nB ->\n").expect("write fixture");

    let json = run_json(&["-p", "A", "--test-repo", &path.display().to_string()]);
    assert_eq!(json["edges"]["Missing"], json!([]));
    assert_eq!(json["failures"][0]["package"], "Missing");
    assert_eq!(json["statistics"]["lookup_failures"], 1);
}

// ============================================================================
// Reverse Analysis
// ============================================================================

#[test]
fn test_reverse_simple() {
    let json = run_json(&[
        "-p",
        "D",
        "--test-repo",
        &fixture_path("simple_test.txt"),
        "--reverse",
    ]);

    assert_eq!(json["direction"], "reverse");
    assert_eq!(
        json["edges"],
        json!({"D": ["B", "C"], "B": ["A"], "A": [], "C": ["A"]})
    );
    assert_eq!(json["direct_dependents"], json!(["B", "C"]));
    assert!(json.get("levels").is_none());
}

#[test]
fn test_reverse_complex_with_depth() {
    let json = run_json(&[
        "-p",
        "C",
        "--test-repo",
        &fixture_path("complex_test.txt"),
        "--reverse",
        "--max-depth",
        "2",
    ]);
    assert_eq!(json["edges"], json!({"C": ["A"], "A": []}));
}

#[test]
fn test_reverse_flat_text() {
    let output = run_depscope(&[
        "-p",
        "M",
        "--test-repo",
        &fixture_path("complex_test.txt"),
        "--reverse",
        "--layout",
        "flat",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Dependents of M"), "{out}");
    assert!(out.contains("F <- B, C"), "{out}");
    assert!(out.contains("M <- I, J"), "{out}");
    assert!(out.contains("Direct dependents of M (2)\n  I, J"), "{out}");
}

#[test]
fn test_reverse_against_registry_is_unsupported() {
    let output = run_depscope(&[
        "-p",
        "Newtonsoft.Json",
        "--url",
        "http://127.0.0.1:9/v3/index.json",
        "--reverse",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error: Unsupported operation"), "{err}");
    assert!(stdout(&output).is_empty());
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_missing_fixture_is_config_error() {
    let output = run_depscope(&["-p", "A", "--test-repo", "/definitely/not/here.txt"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Configuration error"), "{err}");
    assert!(err.contains("test repository not found"), "{err}");
}

#[test]
fn test_contradicting_mode_is_config_error() {
    let output = run_depscope(&[
        "-p",
        "A",
        "--test-repo",
        &fixture_path("simple_test.txt"),
        "--mode",
        "online",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("online mode requires --url"));
}

#[rstest]
#[case::no_source(&["-p", "A"])]
#[case::two_sources(&["-p", "A", "--url", "http://x", "--test-repo", "x.txt"])]
fn test_argument_errors_exit_with_usage(#[case] args: &[&str]) {
    let output = run_depscope(args);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage:"));
}

#[rstest]
#[case::zero("0")]
#[case::not_a_number("deep")]
fn test_invalid_max_depth_is_rejected(#[case] depth: &str) {
    let output = run_depscope(&["-p", "A", "--test-repo", "x.txt", "--max-depth", depth]);

    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("--max-depth"), "{err}");
    assert!(err.contains("invalid value"), "{err}");
}

#[rstest]
fn test_depth_limited_cycle_is_reported(temp_dir: TempDir) {
    let path = temp_dir.path().join("late_cycle.txt");
    fs::write(&path, "R -> X Y\nX -> M\nM -> Y\nY -> X\n").expect("write fixture");

    let json = run_json(&[
        "-p",
        "R",
        "--test-repo",
        &path.display().to_string(),
        "--max-depth",
        "3",
    ]);
    assert_eq!(json["cycle_detected"], true);
    assert_eq!(json["cycles"], json!([["X", "M", "Y", "X"]]));
    assert_eq!(json["edges"]["Y"], json!([]));
    assert_eq!(json["levels"]["4"], json!(["R"]));
    assert_eq!(json["leaves"], json!([]));
}

#[rstest]
fn test_empty_fixture_fails(temp_dir: TempDir) {
    let path = temp_dir.path().join("empty.txt");
    fs::write(&path, "# nothing here\n").expect("write fixture");

    let output = run_depscope(&["-p", "A", "--test-repo", &path.display().to_string()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no package definitions"));
}
