use std::io::Write;

use assert_cmd::Command; // Bring Command into scope
use predicates::prelude::*; // Bring predicate traits into scope

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("stratum")?;

    cmd.arg("--ping");

    cmd.assert()
        .success() // Check for exit code 0
        .stdout(predicate::str::contains("pong")); // Check stdout for "pong"

    Ok(())
}

#[test]
fn test_plugins_lists_load_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("stratum")?;

    cmd.arg("plugins");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1. core-logging"))
        .stdout(predicate::str::contains("2. orders-context"))
        .stdout(predicate::str::contains("[context] depends on: core-logging"));

    Ok(())
}

#[test]
fn test_run_places_demo_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("stratum")?;

    cmd.arg("run");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Initializing application..."))
        .stdout(predicate::str::contains("orders-context: healthy"))
        .stdout(predicate::str::contains("Created order:"))
        .stdout(predicate::str::contains("Stopped 2 plugins cleanly."))
        .stdout(predicate::str::contains("pong").not()); // Ensure "pong" is NOT printed

    Ok(())
}

#[test]
fn test_no_args_runs_normally() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("stratum")?;

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Initializing application..."))
        .stdout(predicate::str::contains("Shutting down application..."));

    Ok(())
}

#[test]
fn test_config_file_is_applied() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "app_name = \"orders-demo\"")?;
    writeln!(file, "[plugins.core-logging]")?;
    writeln!(file, "level = \"warn\"")?;
    writeln!(file, "format = \"compact\"")?;

    let mut cmd = Command::cargo_bin("stratum")?;
    cmd.arg("--config").arg(file.path()).arg("run");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Fetched order:"));

    Ok(())
}

#[test]
fn test_bad_logging_config_fails_bootstrap() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    write!(file, r#"{{"plugins": {{"core-logging": {{"format": "xml"}}}}}}"#)?;

    let mut cmd = Command::cargo_bin("stratum")?;
    cmd.arg("--config").arg(file.path()).arg("run").env_remove("RUST_LOG");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("PLUGIN_LIFECYCLE_ERROR"));

    Ok(())
}

#[test]
fn test_missing_config_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("stratum")?;
    cmd.arg("--config").arg("does-not-exist.toml").arg("plugins");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));

    Ok(())
}
