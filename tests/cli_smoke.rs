use predicates::prelude::*;

#[test]
fn version_flag_prints_crate_version() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("exercise-tracker");
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_server_flags() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("exercise-tracker");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--error-status"));
}

#[test]
fn invalid_port_exits_with_usage_error() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("exercise-tracker");
    cmd.env_remove("PORT");
    cmd.args(["--port", "0"]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--port"));
}
