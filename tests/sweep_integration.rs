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
    fs::write(path.join("Assets/Main.unity"), "scene data").unwrap();
    fs::write(path.join("ProjectSettings/ProjectVersion.txt"), "2022.3").unwrap();
}

#[test]
fn sweep_delete_all_with_force() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("A"));
    make_project(&root.path().join("B"));

    unity_sweeper(&home)
        .args(["sweep", "--delete-all", "--force"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted:  2 projects"));

    assert!(!root.path().join("A").exists());
    assert!(!root.path().join("B").exists());
}

#[test]
fn sweep_archive_named_project() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    make_project(&root.path().join("Keep"));
    make_project(&root.path().join("Shelve"));

    unity_sweeper(&home)
        .args(["sweep", "--archive", "Shelve", "--force", "--dest"])
        .arg(dest.path())
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived: 1 project"));

    assert!(dest.path().join("Shelve.zip").is_file());
    assert!(!root.path().join("Shelve").exists());
    assert!(root.path().join("Keep").exists());
}

#[test]
fn sweep_dry_run_changes_nothing() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("Game"));

    unity_sweeper(&home)
        .args(["sweep", "--delete-all", "--dry-run"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN]"))
        .stdout(predicate::str::contains("delete"));

    assert!(root.path().join("Game").exists());
}

#[test]
fn sweep_aborts_without_confirmation() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("Game"));

    unity_sweeper(&home)
        .args(["sweep", "--delete-all"])
        .arg(root.path())
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted."));

    assert!(root.path().join("Game").exists());
}

#[test]
fn sweep_interactive_prompts() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("First"));
    make_project(&root.path().join("Second"));

    // First: none, Second: delete, then confirm.
    unity_sweeper(&home)
        .arg("sweep")
        .arg(root.path())
        .write_stdin("n\nd\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[a]rchive"))
        .stdout(predicate::str::contains("Deleted:  1 project"));

    assert!(root.path().join("First").exists());
    assert!(!root.path().join("Second").exists());
}

#[test]
fn sweep_nothing_selected() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    make_project(&root.path().join("Game"));

    unity_sweeper(&home)
        .args(["sweep", "--archive", "Other", "--force"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do."))
        .stderr(predicate::str::contains("no project named 'Other'"));
}

#[test]
fn sweep_empty_root() {
    let home = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    unity_sweeper(&home)
        .args(["sweep", "--delete-all", "--force"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No Unity projects found."));
}
