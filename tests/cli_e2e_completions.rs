//! End-to-end tests for the `repo-scout completions` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("repo-scout");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"))
        .stdout(predicate::str::contains("fish"))
        .stdout(predicate::str::contains("powershell"))
        .stdout(predicate::str::contains("elvish"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("repo-scout");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_repo-scout()"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("repo-scout");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef repo-scout"))
        .stdout(predicate::str::contains("organize"));
}

#[test]
fn test_completions_requires_shell() {
    let mut cmd = cargo_bin_cmd!("repo-scout");
    cmd.arg("completions").assert().failure();
}
