use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

/// Nothing listens on the discard port, so any backend call fails fast.
const DEAD_BACKEND: &str = "http://127.0.0.1:9";

fn shadow_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("shadow"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("SHADOW_BACKEND_URL")
        .env_remove("SHADOW_RPC_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn init_project(home: &TempDir, workspace: &TempDir, name: &str) {
    shadow_cmd(home.path())
        .current_dir(workspace.path())
        .args(["init", name])
        .assert()
        .success();
}

fn read_manifest(dir: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(dir.join("shadow.json")).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_project_layout() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    shadow_cmd(home.path())
        .current_dir(workspace.path())
        .args(["init", "my-site", "--storage", "arweave"])
        .assert()
        .success()
        .stdout(contains("Created 'my-site'"));

    let dir = workspace.path().join("my-site");
    for rel in [
        "shadow.json",
        "assets/index.html",
        "README.md",
        ".gitignore",
        "programs/Anchor.toml",
        "programs/programs/my_site/src/lib.rs",
    ] {
        assert!(dir.join(rel).is_file(), "{rel} missing");
    }
    let manifest = read_manifest(&dir);
    assert_eq!(manifest["name"], "my-site");
    assert_eq!(manifest["network"], "devnet");
    assert_eq!(manifest["storage"], "arweave");
    assert!(manifest.get("programAddress").is_none());
}

#[test]
fn init_refuses_existing_directory() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    fs::create_dir(workspace.path().join("taken")).unwrap();

    shadow_cmd(home.path())
        .current_dir(workspace.path())
        .args(["init", "taken"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn init_rejects_bad_name() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    shadow_cmd(home.path())
        .current_dir(workspace.path())
        .args(["init", "1bad"])
        .assert()
        .failure()
        .stderr(contains("invalid project name"));
    assert!(!workspace.path().join("1bad").exists());
}

#[test]
fn init_rejects_unknown_network() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    shadow_cmd(home.path())
        .current_dir(workspace.path())
        .args(["init", "site", "--network", "testnet"])
        .assert()
        .failure()
        .stderr(contains("unknown network"));
}

// ---------------------------------------------------------------------------
// deploy
// ---------------------------------------------------------------------------

#[test]
fn deploy_requires_manifest() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    shadow_cmd(home.path())
        .args(["deploy", "--path"])
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(contains("shadow init"));
}

#[test]
fn deploy_with_nothing_to_publish_fails_before_network() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    init_project(&home, &workspace, "site");
    let dir = workspace.path().join("site");
    fs::remove_dir_all(dir.join("assets")).unwrap();
    fs::remove_file(dir.join("README.md")).unwrap();

    shadow_cmd(home.path())
        .args(["deploy", "--backend-url", DEAD_BACKEND, "--path"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(contains("upload stage failed"))
        .stderr(contains("no deployable files"));

    let manifest = read_manifest(&dir);
    assert!(manifest.get("owner").is_some());
    assert!(manifest.get("storageCid").is_none());
}

#[test]
fn deploy_upload_failure_checkpoints_identity() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    init_project(&home, &workspace, "site");
    let dir = workspace.path().join("site");

    shadow_cmd(home.path())
        .args(["deploy", "--backend-url", DEAD_BACKEND, "--path"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(contains("generated a new identity"))
        .stderr(contains("upload stage failed"));

    assert!(dir.join(".shadow/wallet.json").is_file());
    assert!(dir.join(".shadow/id.json").is_file());
    let manifest = read_manifest(&dir);
    assert!(manifest["owner"].is_string());
    assert!(manifest.get("storageCid").is_none());
    assert!(manifest.get("programAddress").is_none());
}

#[test]
fn deploy_json_reports_failed_state() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    init_project(&home, &workspace, "site");
    let dir = workspace.path().join("site");

    let output = shadow_cmd(home.path())
        .env("SHADOW_BACKEND_URL", DEAD_BACKEND)
        .args(["deploy", "--json", "--path"])
        .arg(&dir)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"], "failed");
    assert_eq!(report["stage"], "upload");
    assert_eq!(report["reached"], "identity_ready");
    assert_eq!(report["warnings"][0]["stage"], "identity");
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[test]
fn status_json_reports_next_stage() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    init_project(&home, &workspace, "site");

    let output = shadow_cmd(home.path())
        .args(["status", "--json", "--path"])
        .arg(workspace.path().join("site"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["manifest"]["name"], "site");
    assert_eq!(status["next_stage"], "identity");
    assert_eq!(status["identity"], false);
    assert!(status.get("chain").is_none());
}

#[test]
fn status_table_names_next_stage() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    init_project(&home, &workspace, "site");

    shadow_cmd(home.path())
        .args(["status", "--path"])
        .arg(workspace.path().join("site"))
        .assert()
        .success()
        .stdout(contains("Next stage: identity"))
        .stdout(contains("devnet"));
}

#[test]
fn status_requires_manifest() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    shadow_cmd(home.path())
        .args(["status", "--path"])
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(contains("not a shadow project"));
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_leaves_existing_project_alone() {
    let home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    init_project(&home, &workspace, "site");
    let dir = workspace.path().join("site");
    let before = fs::read_to_string(dir.join("shadow.json")).unwrap();

    shadow_cmd(home.path())
        .arg("convert")
        .arg(&dir)
        .assert()
        .success()
        .stdout(contains("already a shadow project"));

    assert_eq!(fs::read_to_string(dir.join("shadow.json")).unwrap(), before);
    assert!(!dir.join("shadow-integration.js").exists());
}

#[test]
fn convert_marks_manifest_and_fails_on_dead_backend() {
    let home = TempDir::new().unwrap();
    let site = TempDir::new().unwrap();
    fs::write(site.path().join("index.html"), "<p>legacy</p>").unwrap();

    shadow_cmd(home.path())
        .args(["convert", "--backend-url", DEAD_BACKEND])
        .arg(site.path())
        .assert()
        .failure()
        .stderr(contains("upload stage failed"));

    let manifest = read_manifest(site.path());
    assert_eq!(manifest["converted"], true);
    assert!(manifest["owner"].is_string());
    assert!(!site.path().join("shadow-integration.js").exists());
}
