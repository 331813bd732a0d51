//! End-to-end tests for the graphweave binary

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::tempdir;

fn graphweave() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_graphweave"));
    command.env_remove("GRAPHWEAVE_LOG_LEVEL");
    command.env_remove("GRAPHWEAVE_LOG_FORMAT");
    command.env_remove("RUST_LOG");
    command
}

/// Run with `input` piped to stdin
fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = graphweave()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn graphweave");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for graphweave")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_parse_stdin_to_json() {
    let output = run_with_stdin(&["parse"], "[ Bonn ] -> [ Berlin ]");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(json["nodes"]["Bonn"].is_object());
    assert_eq!(json["edges"][0]["from"], "Bonn");
    assert_eq!(json["edges"][0]["to"], "Berlin");
}

#[test]
fn test_parse_file_to_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("map.dot");
    let output_path = dir.path().join("map.json");
    fs::write(&input, "digraph { rankdir=LR; a -> b }").unwrap();

    let output = graphweave()
        .args(["parse", "--pretty", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output_path)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let written = fs::read_to_string(&output_path).unwrap();
    assert!(written.contains('\n'));
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["attributes"]["flow"], "east");
}

#[test]
fn test_parse_with_explicit_format() {
    let output = run_with_stdin(&["parse", "--format", "txt"], "[ graph ] -> [ digraph ]");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(json["nodes"]["digraph"].is_object());
}

#[test]
fn test_parse_error_exits_non_zero() {
    let output = run_with_stdin(&["parse"], "[ A ] ->");
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    let err = stderr(&output);
    assert!(err.contains("Error: Invalid txt input"));
    assert!(err.contains("never receives a target node"));
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let output = graphweave()
        .args(["parse", "-i"])
        .arg(dir.path().join("missing.gdl"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Failed to read input file"));
}

#[test]
fn test_detect() {
    for (input, expected) in [
        ("graph: { node: { title: \"a\" } }", "gdl"),
        ("strict digraph { a -> b }", "graphviz"),
        ("[ A ]", "txt"),
    ] {
        let output = run_with_stdin(&["detect"], input);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), expected);
    }
}

#[test]
fn test_formats() {
    let output = graphweave().arg("formats").output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("graphviz"));
    assert!(text.contains("Total: 3 formats supported"));

    let output = graphweave().args(["formats", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(json["supported_formats"][0]["name"], "txt");
}

#[test]
fn test_validate() {
    let output = run_with_stdin(&["validate"], "digraph { subgraph s { a -> b } }");
    assert!(output.status.success());
    assert!(stdout(&output).contains("Valid graphviz input: 2 nodes, 1 edges, 1 groups"));

    let output = run_with_stdin(&["validate", "--format", "gdl"], "graph: { node: { } }");
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Invalid gdl input"));
    assert!(stderr(&output).contains("Missing required field 'title'"));
}

#[test]
fn test_unknown_format_flag_is_rejected() {
    let output = graphweave()
        .args(["parse", "--format", "mermaid"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!output.status.success());
}
