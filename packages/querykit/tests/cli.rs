//! Integration tests for the CLI commands

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;

fn write_manifest(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("manifest.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_version_command() {
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("version");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("querykit "));
}

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("querykit "));
}

#[test]
fn test_version_short_flag() {
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("-V");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("querykit "));
}

#[test]
fn test_malformed_bounding_box_is_rejected() {
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.args(["assemble", "--bounding-box", "[0.1, 0.2]"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("exactly 4 elements"));
}

#[test]
fn test_non_numeric_bounding_box_is_rejected() {
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.args(["assemble", "--bounding-box", "[0.1, top, 0.3, 0.4]"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn test_invalid_query_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("assemble")
        .arg("--output-root")
        .arg(dir.path())
        .write_stdin("many\n");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid number"));
}

#[test]
fn test_negative_query_count_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("assemble")
        .arg("--output-root")
        .arg(dir.path())
        .write_stdin("-1\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No queries were added."));
}

#[test]
fn test_zero_queries_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("queries");
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("assemble")
        .arg("--output-root")
        .arg(&out)
        .write_stdin("0\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Welcome to the automated query builder!"))
        .stdout(predicate::str::contains("No queries were added."));
    assert!(!out.exists());
}

#[test]
fn test_empty_manifest_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("queries");
    let manifest = write_manifest(dir.path(), r#"{"folder": "f", "batch_name": "b", "queries": []}"#);

    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("assemble")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output-root")
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No queries were added."));
    assert!(!out.exists());
}

#[test]
fn test_manifest_missing_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("queries");
    let manifest = write_manifest(
        dir.path(),
        r#"{"batch_name": "b", "queries": [{"image": "/no/such/invoice.png", "region": [0, 0, 1, 1]}]}"#,
    );

    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("assemble")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output-root")
        .arg(&out);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read image"));
    assert!(!out.exists());
}

#[test]
fn test_manifest_malformed_region_fails() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("invoice.png");
    std::fs::write(&image, b"not really a png").unwrap();
    let manifest = write_manifest(
        dir.path(),
        &format!(
            r#"{{"batch_name": "b", "queries": [{{"image": {:?}, "region": [0.4, 0, 0.9]}}]}}"#,
            image.display().to_string()
        ),
    );

    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.arg("assemble")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output-root")
        .arg(dir.path().join("queries"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid region"));
}

#[test]
fn test_missing_manifest_file_fails() {
    let mut cmd = cargo_bin_cmd!("querykit");
    cmd.args(["assemble", "--manifest", "/no/such/manifest.json"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load manifest"));
}
