// Regression tests for the mzl binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn mzl() -> Command {
    let mut cmd = Command::cargo_bin("mzl").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn calc_prints_total() {
    mzl()
        .args(["calc", "2", "2"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn calc_applies_sub_then_exp() {
    mzl()
        .args(["calc", "2", "3", "--sub", "1", "--exp", "2"])
        .assert()
        .success()
        .stdout("16\n");
}

#[test]
fn calc_accepts_floats_and_negatives() {
    mzl()
        .args(["calc", "-1", "2.5"])
        .assert()
        .success()
        .stdout("1.5\n");
}

#[test]
fn scopes_adds_through_child() {
    mzl()
        .args(["scopes", "1", "4"])
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn defs_lists_persistence() {
    mzl()
        .args(["defs", "calculate"])
        .assert()
        .success()
        .stdout(contains("Calculate").and(contains("persistent")).and(contains("scope")));
}

#[test]
fn defs_json_is_machine_readable() {
    let output = mzl().args(["defs", "scopes", "--json"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["name"], "calculate");
    assert_eq!(rows[0]["persistent"], true);
}

#[test]
fn overflow_reports_miette_diagnostic() {
    mzl()
        .args(["calc", "2", "--exp", "100"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("mzl::handler").and(contains("cannot update total")));
}

#[test]
fn non_numeric_argument_is_rejected_by_parser() {
    mzl()
        .args(["calc", "two"])
        .assert()
        .failure()
        .stderr(contains("is not a number"));
}

#[test]
fn verbose_logs_builder_activity() {
    mzl()
        .args(["-v", "calc", "1"])
        .assert()
        .success()
        .stdout("1\n")
        .stderr(contains("registered builder method"));
}
