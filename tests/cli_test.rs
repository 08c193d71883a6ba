//! Integration tests for the command-line surface.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command isolated from the caller's settings and overrides.
fn stackup(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("stackup"));
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("CI", "1")
        .env_remove("STACKUP_PROJECT_NAME")
        .env_remove("STACKUP_ROOT")
        .env_remove("STACKUP_NON_INTERACTIVE")
        .env_remove("STACKUP_PROMPT_PROJECT_NAME");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("full-stack"))
        .stdout(predicate::str::contains("check"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_invalid_name_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .args(["new", "--yes", "9lives"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid invocation"));
    assert!(!home.path().join("9lives").exists());
    Ok(())
}

#[test]
fn cli_missing_name_without_terminal_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .args(["--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("STACKUP_PROMPT_PROJECT_NAME"));
    Ok(())
}

#[test]
fn cli_non_numeric_pin_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .args(["check", "demo", "--node", "latest"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--node expects a numeric version"));
    Ok(())
}

#[test]
fn cli_bad_settings_file_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let config = home.path().join("settings.yml");
    fs::write(&config, "colour: blue\n")?;
    stackup(&home)
        .args(["--config"])
        .arg(&config)
        .args(["check", "demo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn cli_templates_lists_starter_files() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("README.md"))
        .stdout(predicate::str::contains("frontend/package.json"))
        .stdout(predicate::str::contains("project_name"));
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_stackup"));
    Ok(())
}

#[test]
fn cli_unknown_flag_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home)
        .arg("--not-a-flag")
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn cli_debug_flag_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    stackup(&home).args(["--debug", "templates"]).assert().success();
    Ok(())
}
