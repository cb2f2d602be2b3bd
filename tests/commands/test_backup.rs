//! Tests for the backup command against the in-memory messenger

use telegram_backup::commands::run_with;
use telegram_backup::error::Error;
use telegram_backup::export::from_json;
use telegram_backup::{Config, Message};

use super::{bob, negar, FakeMessenger};

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        output_path: dir.path().join("dialogue.json"),
        credentials_path: dir.path().join("credentials.session"),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_backup_fetches_three_pages_for_250_messages() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let fake = FakeMessenger::new(vec![bob(), negar()], 250);

    let dialogue = run_with(&fake, "Negar", &config).await.unwrap();

    assert_eq!(fake.offsets(), vec![0, 100, 200]);
    assert_eq!(dialogue.message_count, 250);
    assert_eq!(dialogue.messages.len(), 250);
    // Two user records per page, never deduplicated.
    assert_eq!(dialogue.users.len(), 6);
    assert_eq!(dialogue.users[0].user_id, negar().id);
}

#[tokio::test]
async fn test_backup_writes_export_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let fake = FakeMessenger::new(vec![negar()], 3);

    let dialogue = run_with(&fake, "negar_k", &config).await.unwrap();

    let written = std::fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(from_json(&written).unwrap(), dialogue);

    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["message_count"], 3);
    assert_eq!(value["messages"][0]["id"], 3);
    assert_eq!(value["messages"][0]["msg"], "message 3");
    assert_eq!(value["users"][0]["first_name"], "Negar");
    assert_eq!(value["users"][0]["phone"], "15550001");
}

#[tokio::test]
async fn test_backup_missing_contact_stops_before_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let fake = FakeMessenger::new(vec![bob()], 10);

    let fatal = run_with(&fake, "Negar", &config).await.unwrap_err();

    assert!(matches!(fatal.error(), Error::ContactNotFound(ref n) if n == "Negar"));
    assert!(fatal.to_string().contains("Negar"));
    assert_eq!(fatal.exit_code(), 2);
    assert!(fake.offsets().is_empty());
    assert!(!config.output_path.exists());
}

#[tokio::test]
async fn test_backup_ambiguous_name_uses_first_match() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let fake = FakeMessenger::new(vec![bob(), negar()], 1);

    // "e" matches "Stone" and "Negar".
    let dialogue = run_with(&fake, "e", &config).await.unwrap();
    assert_eq!(dialogue.users[0].user_id, bob().id);

    let fake = FakeMessenger::new(vec![bob(), negar()], 1);
    let dialogue = run_with(&fake, "", &config).await.unwrap();
    assert_eq!(dialogue.users[0].user_id, bob().id);
}

#[tokio::test]
async fn test_backup_empty_history_fetches_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let fake = FakeMessenger::new(vec![negar()], 0);

    let dialogue = run_with(&fake, "Negar", &config).await.unwrap();

    assert_eq!(fake.offsets(), vec![0]);
    assert!(dialogue.messages.is_empty());
    let written = std::fs::read_to_string(&config.output_path).unwrap();
    assert!(written.starts_with("{\"message_count\":0,\"messages\":[],"));
}

#[tokio::test]
async fn test_backup_keeps_placeholder_for_service_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut fake = FakeMessenger::new(vec![negar()], 150);
    fake.service_at = vec![1, 120];

    let dialogue = run_with(&fake, "Negar", &config).await.unwrap();

    assert_eq!(dialogue.messages.len(), 150);
    assert_eq!(dialogue.messages[1], Message::default());
    assert_eq!(dialogue.messages[120], Message::default());
    assert_eq!(dialogue.messages[0].id, 150);
    assert_eq!(dialogue.messages[2].id, 148);
}

#[tokio::test]
async fn test_backup_contact_rpc_error_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut fake = FakeMessenger::new(vec![negar()], 5);
    fake.fail_contacts = true;

    let fatal = run_with(&fake, "Negar", &config).await.unwrap_err();

    assert!(matches!(fatal.error(), Error::TelegramError(_)));
    assert!(fatal.location().file().ends_with("backup.rs"));
    assert!(fake.offsets().is_empty());
    assert!(!config.output_path.exists());
}

#[tokio::test]
async fn test_backup_pretty_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir);
    config.pretty = true;
    let fake = FakeMessenger::new(vec![negar()], 2);

    run_with(&fake, "Negar", &config).await.unwrap();

    let written = std::fs::read_to_string(&config.output_path).unwrap();
    assert!(written.contains("\n  \"messages\": ["));
}
