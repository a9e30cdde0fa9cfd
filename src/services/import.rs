//! Import reconciler: merges incoming test case documents into the store.

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{ImportPayload, RecordId, RecordPayload, TestCase};
use crate::services::archive::ArchiveMember;
use crate::services::store::TestCaseStore;

/// Tally of one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Inserted or replaced records
    pub imported: usize,
    /// Entries without a usable name or with the wrong shape
    pub invalid: usize,
    /// Entries skipped because the name exists and overwrite is off
    pub collisions: usize,
    /// Archive members that could not be read or parsed
    pub unreadable: usize,
}

impl ImportSummary {
    /// Entries that did not make it into the store.
    pub fn skipped(&self) -> usize {
        self.invalid + self.collisions + self.unreadable
    }
}

/// What happened to one candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Inserted(RecordId),
    /// An existing record with the same name was replaced; the id may change
    Replaced { previous: RecordId, current: RecordId },
    Collision(String),
    Invalid(String),
}

/// Candidate entries decoded from an import source, before reconciliation.
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    pub entries: Vec<JsonValue>,
    /// Members dropped while decoding
    pub unreadable: usize,
}

impl DecodedBatch {
    /// Decode a single JSON document (one record or a backup).
    ///
    /// Malformed JSON fails the whole document.
    pub fn from_document(content: &str) -> AppResult<Self> {
        Ok(DecodedBatch {
            entries: ImportPayload::parse(content)?.into_entries(),
            unreadable: 0,
        })
    }

    /// Decode archive members; unreadable or malformed ones are counted and skipped.
    pub fn from_members(members: Vec<ArchiveMember>) -> Self {
        let mut batch = DecodedBatch::default();

        for member in members {
            let parsed = member
                .content
                .and_then(|text| Ok(ImportPayload::parse(&text)?));
            match parsed {
                Ok(payload) => batch.entries.extend(payload.into_entries()),
                Err(e) => {
                    warn!("Skipping archive entry {}: {}", member.name, e);
                    batch.unreadable += 1;
                }
            }
        }

        batch
    }
}

/// Merge a decoded batch into the store under the given overwrite policy.
///
/// Never fails: problems with individual entries are tallied in the summary.
pub fn reconcile(store: &mut TestCaseStore, batch: DecodedBatch, overwrite: bool) -> ImportSummary {
    let mut summary = ImportSummary {
        unreadable: batch.unreadable,
        ..Default::default()
    };

    info!(
        "Reconciling {} entries (overwrite: {})",
        batch.entries.len(),
        overwrite
    );

    for entry in batch.entries {
        match reconcile_entry(store, entry, overwrite) {
            EntryOutcome::Inserted(_) | EntryOutcome::Replaced { .. } => summary.imported += 1,
            EntryOutcome::Collision(name) => {
                warn!("Skipping \"{}\": a test case with this name exists", name);
                summary.collisions += 1;
            }
            EntryOutcome::Invalid(reason) => {
                warn!("Skipping entry: {}", reason);
                summary.invalid += 1;
            }
        }
    }

    info!(
        "Import finished: {} imported, {} invalid, {} collisions, {} unreadable",
        summary.imported, summary.invalid, summary.collisions, summary.unreadable
    );

    summary
}

/// Reconcile one candidate entry.
pub fn reconcile_entry(
    store: &mut TestCaseStore,
    entry: JsonValue,
    overwrite: bool,
) -> EntryOutcome {
    if !entry.is_object() {
        return EntryOutcome::Invalid("entry is not a JSON object".to_string());
    }

    let payload: RecordPayload = match serde_json::from_value(entry) {
        Ok(payload) => payload,
        Err(e) => return EntryOutcome::Invalid(e.to_string()),
    };

    let Some(name) = payload.valid_name().map(str::to_string) else {
        return EntryOutcome::Invalid("missing name".to_string());
    };

    let existing = store.find_by_name(&name).map(|r| r.id().clone());
    match existing {
        Some(_) if !overwrite => EntryOutcome::Collision(name),
        Some(previous) => {
            let mut record = payload.into_test_case();
            ensure_unique_id(store, &mut record, Some(&previous));
            let current = record.id().clone();
            match store.replace_by_id(&previous, record) {
                Ok(()) => EntryOutcome::Replaced { previous, current },
                Err(e) => EntryOutcome::Invalid(e.to_string()),
            }
        }
        None => {
            let mut record = payload.into_test_case();
            ensure_unique_id(store, &mut record, None);
            let current = record.id().clone();
            match store.insert(record) {
                Ok(()) => EntryOutcome::Inserted(current),
                Err(e) => EntryOutcome::Invalid(e.to_string()),
            }
        }
    }
}

/// Give `record` a fresh id if its id belongs to another stored record.
///
/// `replacing` is the record about to be overwritten, whose id may be reused.
fn ensure_unique_id(store: &TestCaseStore, record: &mut TestCase, replacing: Option<&RecordId>) {
    let id = record.id();
    if replacing == Some(id) || !store.contains_id(id) {
        return;
    }

    let fresh = RecordId::generate();
    warn!(
        "Imported id {} is already used by another test case; assigning {}",
        id, fresh
    );
    record.set_id(fresh);
}
