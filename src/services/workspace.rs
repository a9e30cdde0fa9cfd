//! The application object: owns the store and exposes editor and transfer operations.
//!
//! Mutating operations take `&mut self`, so an import can never interleave
//! with another import, export or edit on the same workspace.

use std::path::Path;

use tracing::{info, warn};

use crate::config::{Config, ExportSettings};
use crate::error::{AppError, AppResult};
use crate::models::{RecordId, StepFields, StepStatus, TestCase, TestCaseFields, now_millis};
use crate::services::archive::{
    self, Archive, ArchiveEntry, EXPORT_FOLDER, allure_archive_name, export_archive_name,
};
use crate::services::export::{self, AllureTransformer};
use crate::services::filter::TestCaseFilter;
use crate::services::import::{self, DecodedBatch, ImportSummary};
use crate::services::progress::{Operation, ProgressBroadcaster};
use crate::services::store::TestCaseStore;

/// Suffix appended to the name offered when cloning.
const CLONE_SUFFIX: &str = " (Copy)";

/// A JSON document ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content: String,
}

/// Owns the test case store for the lifetime of the application.
#[derive(Debug, Default)]
pub struct Workspace {
    store: TestCaseStore,
    settings: ExportSettings,
    progress: ProgressBroadcaster,
}

impl Workspace {
    pub fn new(settings: ExportSettings) -> Self {
        Workspace {
            store: TestCaseStore::new(),
            settings,
            progress: ProgressBroadcaster::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.export.clone())
    }

    pub fn store(&self) -> &TestCaseStore {
        &self.store
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Progress and in-flight events of exports and imports.
    pub fn progress(&self) -> &ProgressBroadcaster {
        &self.progress
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Create a test case from editor input and return its id.
    pub fn create(&mut self, fields: TestCaseFields, steps: Vec<StepFields>) -> AppResult<RecordId> {
        let fields = require_name(fields)?;

        let mut record = TestCase::new(fields);
        for step in collect_steps(steps) {
            record.add_step(step);
        }

        let id = record.id().clone();
        self.store.insert(record)?;
        info!("Created test case {}", id);
        Ok(id)
    }

    /// Replace every field and step of an existing test case.
    ///
    /// Returns `Ok(false)` when the id no longer exists.
    pub fn update(
        &mut self,
        id: &RecordId,
        fields: TestCaseFields,
        steps: Vec<StepFields>,
    ) -> AppResult<bool> {
        let fields = require_name(fields)?;

        let Some(record) = self.store.find_by_id_mut(id) else {
            return Ok(false);
        };
        record.replace_fields(fields);
        record.replace_steps(collect_steps(steps));

        info!("Updated test case {}", id);
        Ok(true)
    }

    /// Name offered to the user when cloning, `<name> (Copy)`.
    pub fn suggested_clone_name(&self, id: &RecordId) -> Option<String> {
        self.store
            .find_by_id(id)
            .map(|r| format!("{}{}", r.name, CLONE_SUFFIX))
    }

    /// Clone a test case under a new name.
    ///
    /// Returns `Ok(None)` when the source id no longer exists.
    pub fn clone_test_case(&mut self, id: &RecordId, new_name: &str) -> AppResult<Option<RecordId>> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::Validation(
                "Name of the cloned test case must not be empty".to_string(),
            ));
        }

        let Some(source) = self.store.find_by_id(id) else {
            return Ok(None);
        };
        let copy = source.duplicate(new_name);

        let copy_id = copy.id().clone();
        self.store.insert(copy)?;
        info!("Cloned test case {} into {}", id, copy_id);
        Ok(Some(copy_id))
    }

    /// Delete a test case. Unknown ids are ignored.
    pub fn delete(&mut self, id: &RecordId) -> bool {
        let removed = self.store.delete_by_id(id);
        if removed {
            info!("Deleted test case {}", id);
        }
        removed
    }

    /// Test cases matching the filter, in store order.
    pub fn filtered(&self, filter: &TestCaseFilter) -> Vec<&TestCase> {
        filter.apply(&self.store)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Canonical JSON of one test case. `Ok(None)` when the id is unknown.
    pub fn export_single(&self, id: &RecordId) -> AppResult<Option<ExportedFile>> {
        let Some(record) = self.store.find_by_id(id) else {
            return Ok(None);
        };

        Ok(Some(ExportedFile {
            file_name: export::single_export_file_name(record, now_millis()),
            content: export::canonical_json(record)?,
        }))
    }

    /// Backup of the whole store. An empty store yields an empty backup.
    pub fn backup(&self) -> AppResult<ExportedFile> {
        let timestamp = now_millis();
        Ok(ExportedFile {
            file_name: export::backup_file_name(timestamp),
            content: export::backup_json(&self.store, timestamp)?,
        })
    }

    /// Zip of every test case as canonical JSON under `test-cases/`.
    ///
    /// `Ok(None)` means there was nothing to export.
    pub async fn export_archive(&self) -> AppResult<Option<Archive>> {
        if self.store.is_empty() {
            return Ok(None);
        }

        let entries = self
            .store
            .iter()
            .map(|record| {
                Ok(ArchiveEntry::new(
                    export::archive_file_name(record),
                    export::canonical_json(record)?,
                ))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let archive = self
            .package(
                export_archive_name(now_millis()),
                Some(EXPORT_FOLDER),
                entries,
                Operation::ExportArchive,
            )
            .await?;
        Ok(Some(archive))
    }

    /// Zip of one Allure result document per test case.
    ///
    /// `Ok(None)` means there was nothing to export.
    pub async fn export_allure(&self) -> AppResult<Option<Archive>> {
        if self.store.is_empty() {
            return Ok(None);
        }

        let transformer = AllureTransformer::new(self.settings.clone());
        let start = now_millis();
        let entries = self
            .store
            .iter()
            .map(|record| {
                let result = transformer.transform(record, start);
                Ok(ArchiveEntry::new(
                    result.file_name(),
                    serde_json::to_string_pretty(&result)?,
                ))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let archive = self
            .package(allure_archive_name(start), None, entries, Operation::AllureArchive)
            .await?;
        Ok(Some(archive))
    }

    async fn package(
        &self,
        file_name: String,
        folder: Option<&'static str>,
        entries: Vec<ArchiveEntry>,
        operation: Operation,
    ) -> AppResult<Archive> {
        let in_flight = self.progress.begin(operation);
        let progress = self.progress.clone();
        let count = entries.len();

        let archive = tokio::task::spawn_blocking(move || {
            archive::package(file_name, folder, &entries, &progress, operation)
        })
        .await
        .map_err(|e| AppError::Packaging(format!("Archive task failed: {}", e)))??;

        info!(
            "Exported {} test cases to {} ({})",
            count,
            archive.file_name,
            operation.as_str()
        );
        in_flight.succeed();
        Ok(archive)
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Import a JSON document or zip archive from disk.
    pub async fn import_file(&mut self, path: &Path, overwrite: bool) -> AppResult<ImportSummary> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Read(format!("Failed to read {}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.import_bytes(&file_name, bytes, overwrite).await
    }

    /// Import an already-read file. Names ending in `.zip` are treated as archives.
    ///
    /// The store is only touched once the whole input has been decoded, so a
    /// failed read or parse leaves it unchanged.
    pub async fn import_bytes(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> AppResult<ImportSummary> {
        let in_flight = self.progress.begin(Operation::Import);
        info!("Starting import of {} ({} bytes)", file_name, bytes.len());

        let batch = if file_name.ends_with(".zip") {
            let progress = self.progress.clone();
            let members =
                tokio::task::spawn_blocking(move || archive::read_json_members(&bytes, &progress))
                    .await
                    .map_err(|e| AppError::Read(format!("Archive task failed: {}", e)))??;
            DecodedBatch::from_members(members)
        } else {
            let content = String::from_utf8(bytes)
                .map_err(|e| AppError::Parse(format!("{} is not UTF-8: {}", file_name, e)))?;
            DecodedBatch::from_document(&content)?
        };

        let summary = import::reconcile(&mut self.store, batch, overwrite);
        if summary.imported == 0 {
            warn!("Nothing imported from {}", file_name);
        }

        in_flight.succeed();
        Ok(summary)
    }
}

/// Reject names that are empty after trimming; store the trimmed name.
fn require_name(mut fields: TestCaseFields) -> AppResult<TestCaseFields> {
    let trimmed = fields.name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Test case name must not be empty".to_string(),
        ));
    }
    fields.name = trimmed.to_string();
    Ok(fields)
}

/// Normalize step rows submitted by the editor.
///
/// Text is trimmed, rows without a name are dropped, and the bug link or skip
/// reason is cleared unless the status calls for it.
pub fn collect_steps(drafts: Vec<StepFields>) -> Vec<StepFields> {
    drafts
        .into_iter()
        .filter_map(|draft| {
            let name = draft.name.trim();
            if name.is_empty() {
                return None;
            }

            let bug_link = match draft.status {
                StepStatus::Failed => draft.bug_link.trim().to_string(),
                _ => String::new(),
            };
            let skip_reason = match draft.status {
                StepStatus::Skipped => draft.skip_reason.trim().to_string(),
                _ => String::new(),
            };

            Some(StepFields {
                name: name.to_string(),
                description: draft.description.trim().to_string(),
                expected_result: draft.expected_result.trim().to_string(),
                status: draft.status,
                bug_link,
                skip_reason,
                attachments: draft.attachments.trim().to_string(),
            })
        })
        .collect()
}
