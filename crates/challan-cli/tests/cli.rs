//! End-to-end tests for the challan binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_schema_lists_all_fields() {
    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("orderNo"))
        .stdout(predicate::str::contains("netPayable"));
}

#[test]
fn test_schema_json_is_valid() {
    let mut cmd = Command::cargo_bin("challan").unwrap();
    let output = cmd.arg("schema").arg("--json").output().unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 17);
    assert_eq!(entries[0]["id"], "orderNo");
}

#[test]
fn test_fallback_extracts_labeled_fields() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ocr.txt");
    std::fs::write(&input, "Order No: INV-77\nNet Payable: 1234\n").unwrap();

    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.arg("fallback")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-77"))
        .stdout(predicate::str::contains("\"source\": \"fallback\""));
}

#[test]
fn test_fallback_missing_input_fails() {
    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.arg("fallback")
        .arg("does-not-exist.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_extract_without_credential_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.png");
    std::fs::write(&input, b"not a real image").unwrap();

    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_extract_with_malformed_credential_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.png");
    std::fs::write(&input, b"not a real image").unwrap();

    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.env("GEMINI_API_KEY", "sk-wrong-provider")
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        // The error names the variable and expected shape, never the value.
        .stderr(predicate::str::contains("GEMINI_API_KEY"))
        .stderr(predicate::str::contains("sk-wrong-provider").not());
}

#[test]
fn test_config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("challan.json");

    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.arg("config")
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("gemini-1.5-flash"));

    let mut cmd = Command::cargo_bin("challan").unwrap();
    cmd.arg("config")
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
