//! Integration tests for the edgecfg binary.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const NUXT_TOML: &str = r#"
connector = "@edgio/nuxt"
includeNodeModules = false

[includeFiles]
".env.vault" = true
"#;

/// `edgecfg` running inside `dir`, isolated from the caller's logging and env.
fn edgecfg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_edgecfg"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("EDGE_DEPLOY_TOKEN")
        .env_remove("DEPLOY_REGION");
    cmd
}

fn project(descriptor: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("edgecfg.toml"), descriptor).unwrap();
    dir
}

#[test]
fn prints_summary_for_a_valid_descriptor() {
    let dir = project(NUXT_TOML);

    edgecfg_cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("connector: @edgio/nuxt"))
        .stdout(predicate::str::contains("  - .env.vault: true"));
}

#[test]
fn missing_connector_fails_and_names_the_field() {
    let dir = project("includeNodeModules = true\n");

    edgecfg_cmd(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to load deployment config"))
        .stderr(predicate::str::contains("connectorName"));
}

#[test]
fn wrong_value_type_fails_and_names_the_field() {
    let dir = project("connectorName = \"x\"\nincludeNodeModules = \"yes\"\n");

    edgecfg_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("includeNodeModules"));
}

#[test]
fn no_descriptor_in_project_dir_fails() {
    let dir = tempfile::tempdir().unwrap();

    edgecfg_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("edgecfg.toml"));
}

#[test]
fn env_file_is_loaded_before_the_descriptor() {
    // Both inputs are broken; only the env file may be reported.
    let dir = project("connectorName = [");
    fs::write(dir.path().join(".env"), "EDGE_DEPLOY_TOKEN=s3cr3t\nnot a pair\n").unwrap();

    edgecfg_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load env file"))
        .stderr(predicate::str::contains("line 2"))
        .stderr(predicate::str::contains("deployment config").not());
}

#[test]
fn explicit_env_file_must_exist() {
    let dir = project(NUXT_TOML);

    edgecfg_cmd(dir.path())
        .args(["--env-file", "missing.env"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load env file"));
}

#[test]
fn files_lists_the_manifest() {
    let dir = project(
        r#"
connectorName = "x"

[includeFiles]
".env.vault" = true
"build/maps/*.map" = "maps"
"#,
    );
    fs::write(dir.path().join(".env.vault"), "vault").unwrap();
    fs::create_dir_all(dir.path().join("build/maps")).unwrap();
    fs::write(dir.path().join("build/maps/app.js.map"), "{}").unwrap();
    fs::write(dir.path().join("README.md"), "# x").unwrap();

    edgecfg_cmd(dir.path())
        .arg("--files")
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest: 2 entries"))
        .stdout(predicate::str::contains("  file .env.vault\n"))
        .stdout(predicate::str::contains("build/maps/app.js.map -> maps"))
        .stdout(predicate::str::contains("README.md").not());
}

#[test]
fn files_reports_colliding_targets() {
    let dir = project(
        r#"
connectorName = "x"

[includeFiles]
"a/*.txt" = "out"
"b/*.txt" = "out"
"#,
    );
    for sub in ["a", "b"] {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
        fs::write(dir.path().join(sub).join("same.txt"), sub).unwrap();
    }

    edgecfg_cmd(dir.path())
        .arg("--files")
        .assert()
        .failure()
        .stderr(predicate::str::contains("includeFiles.b/*.txt"));
}

#[test]
fn dump_env_redacts_file_values_by_default() {
    let dir = project(NUXT_TOML);
    fs::write(dir.path().join(".env"), "EDGE_DEPLOY_TOKEN=s3cr3t\nDEPLOY_REGION=eu-west\n").unwrap();

    edgecfg_cmd(dir.path())
        .arg("--dump-env")
        .assert()
        .success()
        .stdout(predicate::str::contains("EDGE_DEPLOY_TOKEN = <redacted>"))
        .stdout(predicate::str::contains("DEPLOY_REGION = <redacted>"))
        .stdout(predicate::str::contains("s3cr3t").not())
        .stdout(predicate::str::contains("eu-west").not());
}

#[test]
fn dump_env_no_redact_shows_values() {
    let dir = project(NUXT_TOML);
    fs::write(dir.path().join(".env"), "EDGE_DEPLOY_TOKEN=s3cr3t\nDEPLOY_REGION=eu-west\n").unwrap();

    edgecfg_cmd(dir.path())
        .args(["--dump-env", "--no-redact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EDGE_DEPLOY_TOKEN = s3cr3t"))
        .stdout(predicate::str::contains("DEPLOY_REGION = eu-west"));
}

#[test]
fn process_values_win_over_env_file_unless_overridden() {
    let dir = project(NUXT_TOML);
    fs::write(dir.path().join(".env"), "DEPLOY_REGION=eu-west\n").unwrap();

    edgecfg_cmd(dir.path())
        .env("DEPLOY_REGION", "us-east")
        .args(["--dump-env", "--no-redact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEPLOY_REGION = us-east"));

    edgecfg_cmd(dir.path())
        .env("DEPLOY_REGION", "us-east")
        .args(["--dump-env", "--no-redact", "--env-override"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEPLOY_REGION = eu-west"));
}

#[test]
fn json_report_is_machine_readable() {
    let dir = project(NUXT_TOML);

    let output = edgecfg_cmd(dir.path())
        .args(["--report", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["connectorName"], "@edgio/nuxt");
    assert_eq!(json["includeNodeModules"], false);
    assert_eq!(json["includeFiles"][".env.vault"], true);
}

#[test]
fn explicit_config_path_and_project_dir() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("deploy.json");
    fs::write(&cfg, r#"{ "connectorName": "@edgio/nuxt" }"#).unwrap();

    edgecfg_cmd(dir.path())
        .arg("--config")
        .arg(&cfg)
        .arg("--project-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("connector: @edgio/nuxt"));
}
