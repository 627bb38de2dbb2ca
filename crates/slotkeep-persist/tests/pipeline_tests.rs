//! Integration tests for the save pipeline: backup, commit and rescue

mod common;

use common::*;
use slotkeep_persist::{BlobSource, Error, KeyValueStore, Persister, SaveState};
use std::path::PathBuf;

/// Leaves a torn primary file behind and reports the write as failed
struct TornWrite {
    primary: PathBuf,
}

impl BlobSource for TornWrite {
    fn make_blob(&self) -> slotkeep_persist::Result<String> {
        std::fs::write(&self.primary, "eJzL").unwrap();
        Err(Error::storage_io(
            self.primary.display().to_string(),
            std::io::Error::other("no space left on device"),
        ))
    }
}

#[tokio::test]
async fn test_end_to_end_backup_and_rescue() {
    let (saves, store) = key_value_pipeline();

    // Slot 1 starts with "A"
    assert!(saves.save(slot(1), "A", None).await.is_success());

    // Saving "B" keeps the previous data as backup
    let outcome = saves.save(slot(1), "B", None).await;
    assert_eq!(outcome.state, SaveState::Committed);
    assert_eq!(saves.load_game(slot(1)).await.unwrap(), Some("B".to_string()));
    assert!(saves.storage().backup_exists(slot(1)).await.unwrap());
    assert_eq!(
        saves.backups().load_backup(slot(1)).await.unwrap(),
        Some("A".to_string())
    );

    // A failing write of "C" leaves "B" in place
    store.fail_next_writes(primary_key(1), 1);
    let outcome = saves.save(slot(1), "C", None).await;
    assert_eq!(outcome.state, SaveState::Rescued);
    assert!(outcome.error.is_some());
    assert_eq!(saves.load_game(slot(1)).await.unwrap(), Some("B".to_string()));
    assert!(!saves.storage().backup_exists(slot(1)).await.unwrap());
}

#[tokio::test]
async fn test_rescue_restores_exact_previous_blob() {
    let (saves, store) = key_value_pipeline();
    let b0 = r#"{"party":["Harold","Therese"],"gold":4096,"map":12}"#;
    saves.save(slot(2), b0, None).await;

    saves.backups().backup(slot(2)).await.unwrap();
    store.fail_next_writes(primary_key(2), 1);
    assert!(saves.storage().save(slot(2), "broken").await.is_err());
    saves.backups().restore(slot(2)).await.unwrap();

    assert_eq!(saves.load_game(slot(2)).await.unwrap(), Some(b0.to_string()));
    assert!(!saves.storage().backup_exists(slot(2)).await.unwrap());
}

#[tokio::test]
async fn test_rescue_failure_still_reports_false() {
    let (saves, store) = key_value_pipeline();
    saves.save(slot(3), "A", None).await;

    // Both the save and the restore write fail
    store.fail_next_writes(primary_key(3), 2);
    let persister: &dyn Persister = &saves;
    assert!(!persister.save_game(slot(3), "B").await);

    // The backup survives for a later manual restore
    assert!(saves.storage().backup_exists(slot(3)).await.unwrap());
    assert!(saves.backups().restore(slot(3)).await.unwrap());
    assert_eq!(saves.load_game(slot(3)).await.unwrap(), Some("A".to_string()));
}

#[tokio::test]
async fn test_backup_of_empty_slot_is_noop() {
    let (saves, _store) = key_value_pipeline();
    assert!(!saves.backups().backup(slot(4)).await.unwrap());
    assert!(!saves.storage().backup_exists(slot(4)).await.unwrap());
}

#[tokio::test]
async fn test_clean_is_idempotent() {
    let (saves, _store) = key_value_pipeline();
    assert!(!saves.backups().clean(slot(5)).await.unwrap());

    saves.save(slot(5), "A", None).await;
    saves.save(slot(5), "B", None).await;
    assert!(saves.backups().clean(slot(5)).await.unwrap());
    assert!(!saves.backups().clean(slot(5)).await.unwrap());
    assert_eq!(saves.load_game(slot(5)).await.unwrap(), Some("B".to_string()));
}

#[tokio::test]
async fn test_filesystem_pipeline() {
    let (saves, temp_dir) = filesystem_pipeline();

    saves.save(slot(1), "first", Some("Day 1".to_string())).await;
    saves.save(slot(1), "second", Some("Day 2".to_string())).await;

    let save_dir = temp_dir.path().join("save");
    assert!(save_dir.join("file1.rpgsave").is_file());
    assert!(save_dir.join("file1.rpgsave.bak").is_file());
    assert!(save_dir.join("global.rpgsave").is_file());

    assert_eq!(
        saves.load_game(slot(1)).await.unwrap(),
        Some("second".to_string())
    );
    let slots = saves.list_slots().await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].1.title.as_deref(), Some("Day 2"));

    saves.delete_game(slot(1)).await.unwrap();
    assert!(!save_dir.join("file1.rpgsave").exists());
    assert!(!save_dir.join("file1.rpgsave.bak").exists());
}

#[tokio::test]
async fn test_filesystem_rescue_after_torn_write() {
    let (saves, temp_dir) = filesystem_pipeline();
    let b0 = r#"{"party":["Harold"],"gold":12}"#;
    assert!(saves.save(slot(3), b0, None).await.is_success());

    let save_dir = temp_dir.path().join("save");
    let source = TornWrite {
        primary: save_dir.join("file3.rpgsave"),
    };
    let outcome = saves.save_from(&source, None, slot(3)).await;

    assert_eq!(outcome.state, SaveState::Rescued);
    assert!(outcome.error.unwrap().contains("no space left"));
    assert_eq!(saves.load_game(slot(3)).await.unwrap(), Some(b0.to_string()));
    assert!(!save_dir.join("file3.rpgsave.bak").exists());
    assert!(!saves.storage().backup_exists(slot(3)).await.unwrap());
}

#[tokio::test]
async fn test_filesystem_unreadable_primary_fails_before_backup() {
    let (saves, temp_dir) = filesystem_pipeline();
    let save_dir = temp_dir.path().join("save");
    std::fs::create_dir_all(save_dir.join("file6.rpgsave")).unwrap();

    let outcome = saves.save(slot(6), "new", None).await;

    assert_eq!(outcome.state, SaveState::FailedBeforeBackup);
    assert!(outcome.error.is_some());
    assert!(save_dir.join("file6.rpgsave").is_dir());
    assert!(!save_dir.join("file6.rpgsave.bak").exists());
}

#[tokio::test]
async fn test_at_rest_data_is_compact_text() {
    let (saves, temp_dir) = filesystem_pipeline();
    let blob = "x".repeat(10_000);
    saves.save(slot(7), &blob, None).await;

    let raw = std::fs::read_to_string(temp_dir.path().join("save/file7.rpgsave")).unwrap();
    assert!(raw.len() < blob.len());
    assert!(raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
}

#[tokio::test]
async fn test_absent_sentinel_on_key_value_medium() {
    let (saves, store) = key_value_pipeline();
    assert_eq!(saves.load_game(slot(8)).await.unwrap(), None);

    // A raw empty value is the absent sentinel too
    store.set_item(&primary_key(8), "").await.unwrap();
    assert_eq!(saves.load_game(slot(8)).await.unwrap(), None);
    assert!(!saves.exists(slot(8)).await.unwrap());
}
