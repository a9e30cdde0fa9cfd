//! Backup document and the shapes accepted on import.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use super::ids::{RecordId, StepId};
use super::step::{Step, StepFields, StepStatus};
use super::test_case::{Priority, Severity, TestCase, TestCaseFields, TestType, now_millis};

/// Version tag written into every backup.
pub const BACKUP_VERSION: &str = "1.0";

/// Full-collection backup (`backup-<timestamp>.json`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup<'a> {
    pub timestamp: i64,
    pub version: &'static str,
    pub test_cases: Vec<&'a TestCase>,
}

/// Top-level shape of an imported JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPayload {
    /// A single canonical test case document
    Single(JsonValue),
    /// A backup document; each entry is a candidate test case
    Backup(Vec<JsonValue>),
}

impl ImportPayload {
    /// Classify a parsed document. A `testCases` array marks a backup.
    pub fn from_value(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(mut map)
                if map.get("testCases").is_some_and(JsonValue::is_array) =>
            {
                match map.remove("testCases") {
                    Some(JsonValue::Array(entries)) => ImportPayload::Backup(entries),
                    _ => ImportPayload::Backup(Vec::new()),
                }
            }
            other => ImportPayload::Single(other),
        }
    }

    /// Parse a document from text.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<JsonValue>(content).map(Self::from_value)
    }

    /// Candidate record documents, in document order.
    pub fn into_entries(self) -> Vec<JsonValue> {
        match self {
            ImportPayload::Single(value) => vec![value],
            ImportPayload::Backup(entries) => entries,
        }
    }
}

/// A test case as found in an imported document.
///
/// Every field is optional; absent or empty values fall back to the model
/// defaults when converted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub preconditions: Option<String>,
    pub expected_result: Option<String>,
    pub epic: Option<String>,
    pub feature: Option<String>,
    pub story: Option<String>,
    pub component: Option<String>,
    pub test_layer: Option<String>,
    pub severity: Option<String>,
    pub priority: Option<String>,
    pub environment: Option<String>,
    pub browser: Option<String>,
    pub owner: Option<String>,
    pub author: Option<String>,
    pub reviewer: Option<String>,
    pub test_case_id: Option<String>,
    pub issue_links: Option<String>,
    pub test_case_links: Option<String>,
    pub tags: Option<String>,
    pub test_type: Option<String>,
    pub steps: Option<Vec<StepPayload>>,
    pub created_at: Option<serde_json::Number>,
    pub updated_at: Option<serde_json::Number>,
}

/// A step as found in an imported document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub expected_result: Option<String>,
    pub status: Option<String>,
    pub bug_link: Option<String>,
    pub skip_reason: Option<String>,
    pub attachments: Option<String>,
}

impl RecordPayload {
    /// The name, if present and non-empty.
    pub fn valid_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Build a test case, filling defaults. A missing id is generated.
    pub fn into_test_case(self) -> TestCase {
        let now = now_millis();
        let id = non_empty(self.id)
            .map(RecordId::from)
            .unwrap_or_else(RecordId::generate);
        let created_at = millis(self.created_at).unwrap_or(now);
        let updated_at = millis(self.updated_at).unwrap_or(now);

        let fields = TestCaseFields {
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            preconditions: self.preconditions.unwrap_or_default(),
            expected_result: self.expected_result.unwrap_or_default(),
            epic: self.epic.unwrap_or_default(),
            feature: self.feature.unwrap_or_default(),
            story: self.story.unwrap_or_default(),
            component: self.component.unwrap_or_default(),
            test_layer: self.test_layer.unwrap_or_default(),
            severity: enum_or_default(self.severity, "severity", Severity::parse),
            priority: enum_or_default(self.priority, "priority", Priority::parse),
            environment: self.environment.unwrap_or_default(),
            browser: self.browser.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            reviewer: self.reviewer.unwrap_or_default(),
            test_case_id: self.test_case_id.unwrap_or_default(),
            issue_links: self.issue_links.unwrap_or_default(),
            test_case_links: self.test_case_links.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            test_type: enum_or_default(self.test_type, "testType", TestType::parse),
        };

        let steps = self
            .steps
            .unwrap_or_default()
            .into_iter()
            .map(StepPayload::into_step)
            .collect();

        TestCase::from_parts(id, fields, steps, created_at, updated_at)
    }
}

impl StepPayload {
    /// Build a step, keeping a supplied id and generating one otherwise.
    pub fn into_step(self) -> Step {
        let id = non_empty(self.id)
            .map(StepId::from)
            .unwrap_or_else(StepId::generate);

        Step::with_id(
            id,
            StepFields {
                name: self.name.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                expected_result: self.expected_result.unwrap_or_default(),
                status: enum_or_default(self.status, "step status", StepStatus::parse),
                bug_link: self.bug_link.unwrap_or_default(),
                skip_reason: self.skip_reason.unwrap_or_default(),
                attachments: self.attachments.unwrap_or_default(),
            },
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Epoch milliseconds from a JSON number; zero counts as absent.
fn millis(value: Option<serde_json::Number>) -> Option<i64> {
    value
        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
        .filter(|ms| *ms != 0)
}

fn enum_or_default<T: Default>(
    value: Option<String>,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    match non_empty(value) {
        None => T::default(),
        Some(raw) => parse(&raw).unwrap_or_else(|| {
            warn!("Unknown {} '{}', using default", field, raw);
            T::default()
        }),
    }
}
