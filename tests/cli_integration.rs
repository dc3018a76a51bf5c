use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;

fn dirview() -> Command {
    let mut cmd = Command::cargo_bin("dirview").unwrap();
    cmd.env_remove("DIRVIEW_CONFIG");
    cmd
}

fn create_test_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("logs/archive")).unwrap();
    File::create(root.join("logs/app.log"))
        .unwrap()
        .write_all(&vec![b'l'; 1024])
        .unwrap();
    File::create(root.join("logs/archive/old.log"))
        .unwrap()
        .write_all(&vec![b'o'; 1024])
        .unwrap();
    File::create(root.join("config.toml"))
        .unwrap()
        .write_all(b"key = 1\n")
        .unwrap();
    File::create(root.join(".hidden"))
        .unwrap()
        .write_all(b"secret")
        .unwrap();

    dir
}

#[test]
fn shows_help() {
    dirview()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("recursive size"))
        .stdout(predicate::str::contains("--no-custom-icons"))
        .stdout(predicate::str::contains("--no-watch"));
}

#[test]
fn shows_version() {
    dirview()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn list_shows_children_with_sizes() {
    let dir = create_test_tree();

    dirview()
        .arg("--list")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("logs/"))
        .stdout(predicate::str::contains("2.00 KB"))
        .stdout(predicate::str::contains("8 bytes"))
        .stdout(predicate::str::contains(".hidden"))
        .stdout(predicate::str::contains("Total: 2.01 KB in 4 files, 2 directories"));
}

#[test]
fn list_applies_filter() {
    let dir = create_test_tree();

    dirview()
        .args(["--list", "--filter", "config"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("logs/").not());
}

#[test]
fn list_json_output() {
    let dir = create_test_tree();

    let output = dirview()
        .arg("--json")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total"]["bytes"], 2048 + 8 + 6);
    assert_eq!(json["entries"][0]["name"], "logs");
    assert_eq!(json["entries"][0]["size"], "2.00 KB");
}

#[test]
fn list_invalid_root_fails() {
    dirview()
        .args(["--list", "/nonexistent/path/12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a browsable directory"));
}

#[test]
fn list_file_root_fails() {
    let dir = create_test_tree();

    dirview()
        .arg("--list")
        .arg(dir.path().join("config.toml"))
        .assert()
        .failure();
}

#[test]
fn invalid_config_path_fails() {
    let dir = create_test_tree();

    dirview()
        .args(["--config", "/nonexistent/path.toml", "--list"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn verbose_flag_accepted() {
    let dir = create_test_tree();

    dirview()
        .args(["-vv", "--list"])
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn generates_completions() {
    dirview()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dirview"));
}
