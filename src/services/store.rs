//! In-memory collection of test cases.
//!
//! Insertion order is iteration order. Ids are unique across the store.

use crate::error::{AppError, AppResult};
use crate::models::{RecordId, TestCase};

/// Ordered, owned set of test cases.
#[derive(Debug, Clone, Default)]
pub struct TestCaseStore {
    records: Vec<TestCase>,
}

impl TestCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[TestCase] {
        &self.records
    }

    pub fn contains_id(&self, id: &RecordId) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    /// Append a test case.
    pub fn insert(&mut self, record: TestCase) -> AppResult<()> {
        if self.contains_id(record.id()) {
            return Err(AppError::DuplicateId(record.id().to_string()));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn find_by_id(&self, id: &RecordId) -> Option<&TestCase> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &RecordId) -> Option<&mut TestCase> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    /// First test case with exactly this name (case-sensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&TestCase> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Replace the test case stored under `id`, keeping its position.
    ///
    /// The replacement may carry a different id as long as no other record
    /// already uses it.
    pub fn replace_by_id(&mut self, id: &RecordId, record: TestCase) -> AppResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

        let clashes = self
            .records
            .iter()
            .enumerate()
            .any(|(i, r)| i != index && r.id() == record.id());
        if clashes {
            return Err(AppError::DuplicateId(record.id().to_string()));
        }

        self.records[index] = record;
        Ok(())
    }

    /// Remove the test case with this id. Returns whether one was removed;
    /// an unknown id is not an error.
    pub fn delete_by_id(&mut self, id: &RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}

impl<'a> IntoIterator for &'a TestCaseStore {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
