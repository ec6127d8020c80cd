//! CLI tests for `forge generate`.
//!
//! Spawns the forge binary in a scratch directory and checks stdout and the
//! exit code for each outcome.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use forge::exit_codes;

fn forge(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_forge"))
        .current_dir(dir)
        .arg("generate")
        .args(args)
        .output()
        .expect("forge generate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

#[test]
fn integer_payload_is_printed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = forge(temp.path(), &["integer", "42"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "{{42}}\n");
}

#[test]
fn denied_words_shape_the_payload() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = forge(temp.path(), &["string", "ab", "--deny", "'"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "{{\"ab\"}}\n");
}

#[test]
fn config_blacklist_applies() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("forge.toml"),
        "[oracle]\nblacklist = [\"{{\"]\n",
    )
    .expect("write config");
    let output = forge(temp.path(), &["integer", "7"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "{%print(7)%}\n");
}

#[test]
fn rejecting_every_wrapper_exits_with_no_wrapper() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = forge(temp.path(), &["integer", "1", "--deny", "{"]);
    assert_eq!(output.status.code(), Some(exit_codes::NO_WRAPPER));
    assert!(stdout(&output).is_empty());
}

#[test]
fn unreachable_target_exits_with_generation_failed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = forge(temp.path(), &["config"]);
    assert_eq!(output.status.code(), Some(exit_codes::GENERATION_FAILED));
}

#[test]
fn missing_value_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = forge(temp.path(), &["popen-read"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn invalid_config_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("forge.toml"),
        "[synthesis]\nmax_depth = 0\n",
    )
    .expect("write config");
    let output = forge(temp.path(), &["integer", "1"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn tree_output_is_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = forge(temp.path(), &["integer", "-3", "--tree"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["payload"], "{{ -3}}");
    assert_eq!(report["visible"], true);
    let subexpressions = report["subexpressions"].as_array().expect("array");
    assert_eq!(subexpressions.last().and_then(|v| v.as_str()), Some("-3"));
}
