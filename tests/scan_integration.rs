use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MARKERS: [&str; 4] = ["Assets", "ProjectSettings", "Packages", "UserSettings"];

fn unity_sweeper(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("unity-sweeper").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

fn make_project(path: &Path) {
    for marker in MARKERS {
        fs::create_dir_all(path.join(marker)).unwrap();
    }
}

#[test]
fn scan_lists_projects() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("Racer"));
    make_project(&root.path().join("jams/2024/Platformer"));
    fs::create_dir_all(root.path().join("notes")).unwrap();

    unity_sweeper(&home)
        .arg("scan")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Racer"))
        .stdout(predicate::str::contains("Platformer"))
        .stdout(predicate::str::contains("Total: 2 projects"));
}

#[test]
fn scan_empty_directory() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    unity_sweeper(&home)
        .arg("scan")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No Unity projects found"));
}

#[test]
fn scan_json_output() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("Alpha"));
    make_project(&root.path().join("Beta"));

    let output = unity_sweeper(&home)
        .args(["scan", "--json"])
        .arg(root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0]["path"].as_str().unwrap().ends_with("Alpha"));
    assert!(records[1]["path"].as_str().unwrap().ends_with("Beta"));
    assert_eq!(records[0]["disposition"], "none");
}

#[test]
fn scan_does_not_descend_into_projects() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("Outer"));
    make_project(&root.path().join("Outer/Assets/Inner"));

    let output = unity_sweeper(&home)
        .args(["scan", "--json"])
        .arg(root.path())
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[test]
fn scan_missing_root_fails() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    unity_sweeper(&home)
        .arg("scan")
        .arg(root.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn scan_file_root_fails() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let file = root.path().join("file.txt");
    fs::write(&file, "not a directory").unwrap();

    unity_sweeper(&home)
        .arg("scan")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}
