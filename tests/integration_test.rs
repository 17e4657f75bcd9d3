use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_command() -> Result<()> {
    let mut cmd = Command::cargo_bin("manifest-merge")?;
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "Merge container images into a single multi-platform manifest list",
    ));
    Ok(())
}

#[test]
fn test_version_flag() -> Result<()> {
    let mut cmd = Command::cargo_bin("manifest-merge")?;
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("manifest-merge 0.1.0"));
    Ok(())
}

#[test]
fn test_requires_at_least_two_images() -> Result<()> {
    let mut cmd = Command::cargo_bin("manifest-merge")?;
    cmd.arg("repo/app:v1-linux");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn test_invalid_reference_fails_before_any_output() -> Result<()> {
    let mut cmd = Command::cargo_bin("manifest-merge")?;
    let output = cmd
        .arg("not a reference")
        .arg("repo/app:v1-windows")
        .output()?;

    assert!(!output.status.success());

    // No partial document may appear on stdout
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().is_empty(), "stdout should be empty on failure");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid image reference"));
    Ok(())
}

#[test]
fn test_invalid_target_fails_before_any_fetch() -> Result<()> {
    let mut cmd = Command::cargo_bin("manifest-merge")?;
    let output = cmd
        .arg("--target")
        .arg("not a reference")
        .arg("repo/app:v1-linux")
        .arg("repo/app:v1-windows")
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid image reference"));
    Ok(())
}
