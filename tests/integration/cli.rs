//! Integration tests for the `tmplgen` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tmplgen_cli::test_utils::TemplateTree;

fn tmplgen(tree: &TemplateTree) -> Command {
    let config = tree.write_config().unwrap();
    let mut cmd = Command::cargo_bin("tmplgen").unwrap();
    cmd.current_dir(tree.root()).env_remove("RUST_LOG").arg("--config").arg(config);
    cmd
}

#[test]
fn test_generate_prints_without_output() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "name=@{app.name|demo}\nport=1").unwrap();
    tree.add_file("values.yaml", "app:\n  name: shop\n").unwrap();

    tmplgen(&tree)
        .args(["generate", "app.tpl", "--values", "values.yaml", "-p", "port=8080"])
        .assert()
        .success()
        .stdout("name=shop\nport=8080\n");
}

#[test]
fn test_generate_writes_output_and_check_detects_drift() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "port=@{port|80}").unwrap();
    let output = tree.root().join("out/app.conf");

    tmplgen(&tree)
        .args(["generate", "app.tpl", "--no-timestamp", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "port=80\n");

    tmplgen(&tree)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));

    fs::write(&output, "port=81\n").unwrap();
    tmplgen(&tree)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("modified:"))
        .stdout(predicate::str::contains("app.conf"));

    tmplgen(&tree).args(["check", "--strict"]).assert().failure();
}

#[test]
fn test_check_from_another_directory_after_relative_output() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "port=1").unwrap();

    tmplgen(&tree)
        .args(["generate", "app.tpl", "--output", "out/app.conf"])
        .assert()
        .success();
    assert!(tree.root().join("out/app.conf").exists());

    tmplgen(&tree)
        .current_dir(tree.templates_dir())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));
}

#[test]
fn test_generate_missing_template_fails() {
    let tree = TemplateTree::new().unwrap();

    tmplgen(&tree)
        .args(["generate", "absent.tpl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to find a template file for 'absent.tpl'"));
}

#[test]
fn test_generate_rejects_malformed_property() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "a=1").unwrap();

    tmplgen(&tree)
        .args(["generate", "app.tpl", "--property", "a:b:c=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a:b:c=1"));
}

#[test]
fn test_generate_rejects_bad_mode() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "a=1").unwrap();

    tmplgen(&tree).args(["generate", "app.tpl", "--mode", "888"]).assert().failure();
}

#[test]
fn test_locate_all_deduplicates_and_sorts() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("conf.d/b.conf", "").unwrap();
    tree.add_template("conf.d/a.conf", "").unwrap();
    tree.add_template("site/a.conf", "").unwrap();

    let assert = tmplgen(&tree)
        .args(["locate", "--all", "site/*.conf", "conf.d/*.conf"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("site/a.conf"));
    assert!(lines[1].ends_with("conf.d/b.conf"));
}

#[test]
fn test_locate_single_pattern() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "").unwrap();

    tmplgen(&tree)
        .args(["locate", "app.tpl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app.tpl"));

    tmplgen(&tree).args(["locate", "nope.tpl"]).assert().failure();
}

#[test]
fn test_check_without_registry_fails() {
    let tree = TemplateTree::new().unwrap();
    let config = tree.root().join("empty.toml");
    fs::write(&config, "").unwrap();

    Command::cargo_bin("tmplgen")
        .unwrap()
        .args(["--config"])
        .arg(&config)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No watch registry"));
}
