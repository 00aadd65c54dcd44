#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

const BLUEPRINT: &str = r#"
inputs:
  port:
    type: integer
    default: 8080
node_templates:
  network:
    type: topoflow.nodes.Network
    interfaces:
      lifecycle:
        create: memory.tasks.create
        start: memory.tasks.start
        stop: memory.tasks.stop
        delete: memory.tasks.delete
  server:
    type: topoflow.nodes.Server
    interfaces:
      lifecycle:
        create: memory.tasks.create
        start: memory.tasks.start
        stop: memory.tasks.stop
        delete: memory.tasks.delete
    relationships:
      - type: topoflow.relationships.contained_in
        target: network
outputs:
  server_ip:
    value: {get_attribute: [server, ip]}
"#;

fn write_blueprint(dir: &std::path::Path) {
    std::fs::write(dir.join("blueprint.yaml"), BLUEPRINT).unwrap();
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("トポロジ"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("outputs"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("topoflow"));
}

/// validateコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_validate_help() {
    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.arg("validate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[BLUEPRINT]"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// ブループリントのないディレクトリでvalidateするとエラーになることを確認
#[test]
fn test_validate_without_blueprint() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .failure();
}

/// 正常なブループリントのvalidateが成功することを確認
#[test]
fn test_validate_success() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_blueprint(temp_dir.path());

    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("blueprint"));
}

/// 循環依存のあるブループリントでvalidateが失敗することを確認
#[test]
fn test_validate_cycle_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("blueprint.yaml"),
        r#"
node_templates:
  a:
    type: topoflow.nodes.Root
    relationships:
      - type: topoflow.relationships.depends_on
        target: b
  b:
    type: topoflow.nodes.Root
    relationships:
      - type: topoflow.relationships.depends_on
        target: a
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .failure();
}

/// graphコマンドがレベルを表示することを確認
#[test]
fn test_graph_shows_levels() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_blueprint(temp_dir.path());

    let mut cmd = Command::cargo_bin("topo").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("network"))
        .stdout(predicate::str::contains("server"))
        .stdout(predicate::str::contains("contained_in"));
}

/// install → instances → outputs → uninstall の一連の流れを確認
#[test]
fn test_install_outputs_uninstall_roundtrip() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_blueprint(temp_dir.path());

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--deployment", "web"])
        .assert()
        .success();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["instances", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("started"));

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["outputs", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("server_ip"));

    // --yes なしでは確認メッセージのみ
    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["uninstall", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["uninstall", "web", "--yes"])
        .assert()
        .success();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["instances", "web"])
        .assert()
        .failure();
}

/// 同名デプロイメントの二重installは再開扱いになることを確認
#[test]
fn test_install_twice_resumes() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_blueprint(temp_dir.path());

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--deployment", "web"])
        .assert()
        .success();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--deployment", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("再開"))
        .stdout(predicate::str::contains("スキップ: 2個"));
}

/// 再開時に指定した入力値が無視されることが通知されることを確認
#[test]
fn test_install_resume_warns_about_ignored_inputs() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_blueprint(temp_dir.path());

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--deployment", "web", "--input", "port=9090"])
        .assert()
        .success();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--deployment", "web", "--input", "port=7070"])
        .assert()
        .success()
        .stdout(predicate::str::contains("無視されます"));
}

/// --inputs ファイルから入力値を読み込めることを確認
#[test]
fn test_install_inputs_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("blueprint.yaml"),
        r#"
inputs:
  flavor:
    type: string
node_templates:
  vm:
    type: topoflow.nodes.Server
"#,
    )
    .unwrap();
    std::fs::write(temp_dir.path().join("inputs.yaml"), "flavor: m1.large\n").unwrap();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--inputs", "inputs.yaml"])
        .assert()
        .success();
}

/// 必須入力が未指定のinstallがエラーになることを確認
#[test]
fn test_install_missing_input_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("blueprint.yaml"),
        r#"
inputs:
  flavor:
    type: string
node_templates:
  vm:
    type: topoflow.nodes.Server
"#,
    )
    .unwrap();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("install")
        .assert()
        .failure();

    Command::cargo_bin("topo")
        .unwrap()
        .current_dir(temp_dir.path())
        .args(["install", "--input", "flavor=m1.small"])
        .assert()
        .success();
}
