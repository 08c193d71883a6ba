//! Integration tests for template rendering and emission.

use std::fs;

use stackup::template::{backup_path, emit, ConflictPolicy, EmitOutcome, TemplateSpec};
use tempfile::TempDir;

#[test]
fn renders_exact_substitution() {
    let temp = TempDir::new().unwrap();
    let spec = TemplateSpec::new("greeting.txt", "hello {{name}}").with_value("name", "Bob");

    let outcome = emit(&spec, temp.path()).unwrap();
    assert!(matches!(outcome, EmitOutcome::Written(_)));
    assert_eq!(
        fs::read_to_string(temp.path().join("greeting.txt")).unwrap(),
        "hello Bob"
    );
}

#[test]
fn second_emit_is_unchanged() {
    let temp = TempDir::new().unwrap();
    let spec = TemplateSpec::new("nested/dir/file.txt", "v={{v}}").with_value("v", "1");

    assert!(emit(&spec, temp.path()).unwrap().changed());
    let again = emit(&spec, temp.path()).unwrap();
    assert!(!again.changed());
    assert!(matches!(again, EmitOutcome::Unchanged(_)));
}

#[test]
fn missing_value_is_an_error_and_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let spec = TemplateSpec::new("x.txt", "hello {{who}}");

    assert!(emit(&spec, temp.path()).is_err());
    assert!(!temp.path().join("x.txt").exists());
}

#[test]
fn skip_policy_keeps_user_edits() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("README.md"), "mine").unwrap();
    let spec = TemplateSpec::new("README.md", "theirs").on_conflict(ConflictPolicy::Skip);

    assert!(matches!(
        emit(&spec, temp.path()).unwrap(),
        EmitOutcome::Skipped(_)
    ));
    assert_eq!(
        fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "mine"
    );
}

#[test]
fn backup_policy_preserves_previous_content() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("README.md");
    fs::write(&dest, "mine").unwrap();
    let spec =
        TemplateSpec::new("README.md", "theirs").on_conflict(ConflictPolicy::BackupThenOverwrite);

    let outcome = emit(&spec, temp.path()).unwrap();
    assert!(matches!(outcome, EmitOutcome::BackedUp { .. }));
    assert_eq!(fs::read_to_string(&dest).unwrap(), "theirs");
    assert_eq!(fs::read_to_string(backup_path(&dest)).unwrap(), "mine");
}
