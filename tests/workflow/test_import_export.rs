//! Export to disk and import back.

use std::io::{Cursor, Write};

use tempfile::TempDir;
use test_case_studio_lib::error::AppError;
use test_case_studio_lib::models::{Severity, TestCaseFields};
use test_case_studio_lib::services::Workspace;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::test_helpers::*;

#[tokio::test]
async fn test_backup_restores_every_record() {
    let dir = TempDir::new().unwrap();
    let (source, _, _) = seeded_workspace();

    let backup = source.backup().unwrap();
    let path = write_file(dir.path(), &backup.file_name, backup.content.as_bytes()).await;

    let mut target = Workspace::default();
    let summary = target.import_file(&path, false).await.unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(target.store().as_slice(), source.store().as_slice());
}

#[tokio::test]
async fn test_single_export_round_trip_with_overwrite() {
    let dir = TempDir::new().unwrap();
    let (source, login, _) = seeded_workspace();
    let exported = source.export_single(&login).unwrap().unwrap();
    let path = write_file(dir.path(), &exported.file_name, exported.content.as_bytes()).await;

    let mut target = Workspace::default();
    let stale = target
        .create(
            TestCaseFields {
                severity: Severity::Trivial,
                ..TestCaseFields::named("Login test")
            },
            Vec::new(),
        )
        .unwrap();

    let summary = target.import_file(&path, true).await.unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(target.store().len(), 1);
    let original = source.store().find_by_id(&login).unwrap();
    let restored = target.store().find_by_name("Login test").unwrap();
    assert_eq!(restored.fields(), original.fields());
    assert_eq!(restored.steps(), original.steps());
    // Overwriting adopts the id carried by the imported document.
    assert_eq!(restored.id(), original.id());
    assert_ne!(restored.id(), &stale);
}

#[tokio::test]
async fn test_import_without_overwrite_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (source, login, _) = seeded_workspace();
    let exported = source.export_single(&login).unwrap().unwrap();
    let path = write_file(dir.path(), "login.json", exported.content.as_bytes()).await;

    let mut target = Workspace::default();
    let first = target.import_file(&path, false).await.unwrap();
    let second = target.import_file(&path, false).await.unwrap();

    assert_eq!(first.imported, 1);
    assert_eq!(second.imported, 0);
    assert_eq!(second.collisions, 1);
    assert_eq!(target.store().len(), 1);
}

#[tokio::test]
async fn test_exported_archive_imports_into_fresh_workspace() {
    let dir = TempDir::new().unwrap();
    let (source, _, _) = seeded_workspace();
    let archive = source.export_archive().await.unwrap().unwrap();
    let path = write_file(dir.path(), &archive.file_name, &archive.bytes).await;

    let mut target = Workspace::default();
    let summary = target.import_file(&path, false).await.unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(target.store().as_slice(), source.store().as_slice());
}

#[tokio::test]
async fn test_zip_with_mixed_members() {
    let dir = TempDir::new().unwrap();
    let (source, _, _) = seeded_workspace();
    let backup = source.backup().unwrap();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("notes.txt", options).unwrap();
    writer.write_all(b"not a test case").unwrap();
    writer.start_file("broken.json", options).unwrap();
    writer.write_all(b"{ \"name\": ").unwrap();
    writer.start_file("nameless.json", options).unwrap();
    writer.write_all(b"{ \"description\": \"x\" }").unwrap();
    writer.start_file("nested/backup.json", options).unwrap();
    writer.write_all(backup.content.as_bytes()).unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    let path = write_file(dir.path(), "mixed.zip", &bytes).await;

    let mut target = Workspace::default();
    let summary = target.import_file(&path, false).await.unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.unreadable, 1);
    assert_eq!(summary.invalid, 1);
    assert_eq!(target.store().len(), 2);
}

#[tokio::test]
async fn test_unreadable_inputs_leave_store_untouched() {
    let dir = TempDir::new().unwrap();
    let (mut workspace, _, _) = seeded_workspace();
    let before = workspace.store().as_slice().to_vec();

    let bad_json = write_file(dir.path(), "bad.json", b"[1, 2").await;
    let bad_zip = write_file(dir.path(), "bad.zip", b"PK but not really").await;

    assert!(matches!(
        workspace.import_file(&bad_json, true).await,
        Err(AppError::Parse(_))
    ));
    assert!(matches!(
        workspace.import_file(&bad_zip, true).await,
        Err(AppError::Read(_))
    ));
    assert!(matches!(
        workspace
            .import_file(&dir.path().join("missing.json"), true)
            .await,
        Err(AppError::Read(_))
    ));
    assert_eq!(workspace.store().as_slice(), before.as_slice());
}

#[tokio::test]
async fn test_empty_store_has_nothing_to_export() {
    let workspace = Workspace::default();

    assert!(workspace.export_archive().await.unwrap().is_none());
    assert!(workspace.export_allure().await.unwrap().is_none());

    let backup: serde_json::Value =
        serde_json::from_str(&workspace.backup().unwrap().content).unwrap();
    assert_eq!(backup["version"], "1.0");
    assert_eq!(backup["testCases"], serde_json::json!([]));
}
