//! Tests for the compiled binary's exit status and error format

use std::process::Command;

fn backup_command(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_telegram_backup"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("TELEGRAM_API_ID")
        .env_remove("TELEGRAM_SERVER_PORT");
    cmd
}

#[test]
fn test_missing_contact_name_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();

    let output = backup_command(dir.path())
        .args(["--api_id", "1", "--api_hash", "hash", "--phone_number", "+1"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .find(|l| l.starts_with("Error: "))
        .expect("error line");
    assert!(line.contains("backup.rs:"), "no source location in {line}");
    assert!(line.ends_with("No contact named \"\" found"), "{line}");

    // Nothing touched on disk.
    assert!(!dir.path().join("credentials.session").exists());
    assert!(!dir.path().join("credentials.session.lock").exists());
    assert!(!dir.path().join("dialogue.json").exists());
}

#[test]
fn test_missing_explicit_config_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();

    let output = backup_command(dir.path())
        .args(["--config", "absent.yml", "--contact_name", "Negar"])
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: "));
    assert!(stderr.contains("absent.yml"));
}

#[test]
fn test_non_numeric_port_is_rejected_by_parser() {
    let dir = tempfile::tempdir().unwrap();

    let output = backup_command(dir.path())
        .args(["--server_port", "https"])
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}
