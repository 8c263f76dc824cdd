use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SOURCE: &str = "\
import os

def greet(name, punctuation='!'):
    \"\"\"Say hello.\"\"\"
    message = 'Hello ' + name
    return message + punctuation
";

fn write_source(dir: &Path) -> String {
    let path = dir.join("greet.py");
    std::fs::write(&path, SOURCE).unwrap();
    path.to_string_lossy().into_owned()
}

fn introspector() -> Command {
    Command::cargo_bin("introspector").unwrap()
}

#[test]
fn test_vars_lists_parameters_and_module_names() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_source(temp_dir.path());

    introspector()
        .args(["vars", &format!("{file}:6")])
        .assert()
        .success()
        .stdout(predicate::str::contains("name"))
        .stdout(predicate::str::contains("punctuation"))
        .stdout(predicate::str::contains("message"))
        .stdout(predicate::str::contains("os"));
}

#[test]
fn test_vars_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_source(temp_dir.path());

    let output = introspector()
        .args(["--json", "vars", &format!("{file}:5")])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["greet", "name", "os", "punctuation"]);
}

#[test]
fn test_line_outside_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_source(temp_dir.path());

    introspector()
        .args(["vars", &format!("{file}:99")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the file"));
}

#[test]
fn test_docs_and_outline() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_source(temp_dir.path());

    introspector()
        .args(["docs", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("def greet(name, punctuation='!'):"))
        .stdout(predicate::str::contains("Say hello."));

    introspector()
        .args(["outline", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("greet(name, punctuation='!')  [3-6]"));
}

#[test]
fn test_ranges_include_module() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_source(temp_dir.path());

    introspector()
        .args(["ranges", &file])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1-6  module\n3-6  function\n"));
}

#[test]
fn test_refs_reports_one_based_columns() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_source(temp_dir.path());

    introspector()
        .args(["refs", &format!("{file}:6:13")])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{file}:5:5")))
        .stdout(predicate::str::contains(format!("{file}:6:12")));
}

#[test]
fn test_strict_mode_rejects_lexical_errors() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("broken.py");
    std::fs::write(&file, "x = 'unterminated\ny = 2\n").unwrap();
    let file = file.to_string_lossy().into_owned();

    introspector()
        .args(["ranges", &file])
        .assert()
        .success()
        .stderr(predicate::str::contains("unterminated string literal"));

    introspector()
        .args(["--strict", "ranges", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unterminated string literal"));
}

#[test]
fn test_missing_file() {
    introspector()
        .args(["docs", "/no/such/file.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}
