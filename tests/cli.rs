use assert_cmd::Command;

#[test]
fn test_help_lists_guard_options() {
    let output = Command::cargo_bin("remix-guard")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--headed"));
    assert!(help.contains("--timeout-secs"));
    assert!(help.contains("--poll-interval-ms"));
}

#[test]
fn test_rejects_negative_timeout() {
    Command::cargo_bin("remix-guard")
        .unwrap()
        .args(["--timeout-secs", "-1"])
        .assert()
        .failure();
}
