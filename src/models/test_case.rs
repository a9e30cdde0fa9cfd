//! Test case model: the record the editor creates, exports and imports.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ids::RecordId;
use super::step::{Step, StepFields, StepStatus};

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Severity classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Blocker,
    Critical,
    #[default]
    Normal,
    Minor,
    Trivial,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Self::Blocker,
        Self::Critical,
        Self::Normal,
        Self::Minor,
        Self::Trivial,
    ];

    /// Convert to wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER",
            Self::Critical => "CRITICAL",
            Self::Normal => "NORMAL",
            Self::Minor => "MINOR",
            Self::Trivial => "TRIVIAL",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Convert to wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the test case is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    #[default]
    Manual,
    Automated,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automated => "automated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "automated" => Some(Self::Automated),
            _ => None,
        }
    }
}

/// Outcome derived from a test case's steps. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    Passed,
    Failed,
    /// No failures but at least one skipped step
    Mixed,
}

impl DerivedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Editable test case fields.
///
/// Used wholesale by create and update: a field left at its default here
/// reverts the stored value to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseFields {
    pub name: String,
    pub description: String,
    pub preconditions: String,
    pub expected_result: String,
    pub epic: String,
    pub feature: String,
    pub story: String,
    pub component: String,
    pub test_layer: String,
    pub severity: Severity,
    pub priority: Priority,
    pub environment: String,
    pub browser: String,
    pub owner: String,
    pub author: String,
    pub reviewer: String,
    /// External test management id, passed through to Allure `testCaseId`
    pub test_case_id: String,
    /// Comma-separated issue URLs
    pub issue_links: String,
    /// Comma-separated test management URLs
    pub test_case_links: String,
    /// Comma-separated tags
    pub tags: String,
    pub test_type: TestType,
}

impl TestCaseFields {
    /// Fields with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        TestCaseFields {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A test case record.
///
/// Field order matches the canonical JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    id: RecordId,
    pub name: String,
    pub description: String,
    pub preconditions: String,
    pub expected_result: String,
    pub epic: String,
    pub feature: String,
    pub story: String,
    pub component: String,
    pub test_layer: String,
    pub severity: Severity,
    pub priority: Priority,
    pub environment: String,
    pub browser: String,
    pub owner: String,
    pub author: String,
    pub reviewer: String,
    pub test_case_id: String,
    pub issue_links: String,
    pub test_case_links: String,
    pub tags: String,
    pub test_type: TestType,
    steps: Vec<Step>,
    created_at: i64,
    updated_at: i64,
}

impl TestCase {
    /// Create a test case with a fresh id, current timestamps and no steps.
    ///
    /// The name is not validated here; the editor rejects empty names before
    /// calling this.
    pub fn new(fields: TestCaseFields) -> Self {
        let now = now_millis();
        Self::from_parts(RecordId::generate(), fields, Vec::new(), now, now)
    }

    /// Assemble a test case from already-known parts (used by import).
    ///
    /// `updated_at` is raised to `created_at` if it would precede it.
    pub fn from_parts(
        id: RecordId,
        fields: TestCaseFields,
        steps: Vec<Step>,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        TestCase {
            id,
            name: fields.name,
            description: fields.description,
            preconditions: fields.preconditions,
            expected_result: fields.expected_result,
            epic: fields.epic,
            feature: fields.feature,
            story: fields.story,
            component: fields.component,
            test_layer: fields.test_layer,
            severity: fields.severity,
            priority: fields.priority,
            environment: fields.environment,
            browser: fields.browser,
            owner: fields.owner,
            author: fields.author,
            reviewer: fields.reviewer,
            test_case_id: fields.test_case_id,
            issue_links: fields.issue_links,
            test_case_links: fields.test_case_links,
            tags: fields.tags,
            test_type: fields.test_type,
            steps,
            created_at,
            updated_at: updated_at.max(created_at),
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Append a step with a fresh id. Order is execution order.
    pub fn add_step(&mut self, fields: StepFields) -> &Step {
        self.steps.push(Step::new(fields));
        self.touch();
        &self.steps[self.steps.len() - 1]
    }

    /// Status derived from the steps: failed beats skipped beats passed.
    pub fn derive_status(&self) -> DerivedStatus {
        if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            DerivedStatus::Failed
        } else if self.steps.iter().any(|s| s.status == StepStatus::Skipped) {
            DerivedStatus::Mixed
        } else {
            DerivedStatus::Passed
        }
    }

    /// Copy this test case under a new name.
    ///
    /// The copy gets a fresh id, fresh timestamps and fresh step ids; every
    /// other field is carried over. `self` is left untouched.
    pub fn duplicate(&self, new_name: impl Into<String>) -> TestCase {
        let now = now_millis();
        let steps = self
            .steps
            .iter()
            .map(|step| Step::new(step.fields()))
            .collect();

        let mut fields = self.fields();
        fields.name = new_name.into();

        Self::from_parts(RecordId::generate(), fields, steps, now, now)
    }

    /// Replace every editable field. Nothing is merged with the old values.
    pub fn replace_fields(&mut self, fields: TestCaseFields) {
        let TestCaseFields {
            name,
            description,
            preconditions,
            expected_result,
            epic,
            feature,
            story,
            component,
            test_layer,
            severity,
            priority,
            environment,
            browser,
            owner,
            author,
            reviewer,
            test_case_id,
            issue_links,
            test_case_links,
            tags,
            test_type,
        } = fields;

        self.name = name;
        self.description = description;
        self.preconditions = preconditions;
        self.expected_result = expected_result;
        self.epic = epic;
        self.feature = feature;
        self.story = story;
        self.component = component;
        self.test_layer = test_layer;
        self.severity = severity;
        self.priority = priority;
        self.environment = environment;
        self.browser = browser;
        self.owner = owner;
        self.author = author;
        self.reviewer = reviewer;
        self.test_case_id = test_case_id;
        self.issue_links = issue_links;
        self.test_case_links = test_case_links;
        self.tags = tags;
        self.test_type = test_type;
        self.touch();
    }

    /// Replace the whole step sequence; every step gets a fresh id.
    pub fn replace_steps(&mut self, steps: Vec<StepFields>) {
        self.steps = steps.into_iter().map(Step::new).collect();
        self.touch();
    }

    /// Editable fields of this test case.
    pub fn fields(&self) -> TestCaseFields {
        TestCaseFields {
            name: self.name.clone(),
            description: self.description.clone(),
            preconditions: self.preconditions.clone(),
            expected_result: self.expected_result.clone(),
            epic: self.epic.clone(),
            feature: self.feature.clone(),
            story: self.story.clone(),
            component: self.component.clone(),
            test_layer: self.test_layer.clone(),
            severity: self.severity,
            priority: self.priority,
            environment: self.environment.clone(),
            browser: self.browser.clone(),
            owner: self.owner.clone(),
            author: self.author.clone(),
            reviewer: self.reviewer.clone(),
            test_case_id: self.test_case_id.clone(),
            issue_links: self.issue_links.clone(),
            test_case_links: self.test_case_links.clone(),
            tags: self.tags.clone(),
            test_type: self.test_type,
        }
    }

    pub(crate) fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn touch(&mut self) {
        self.updated_at = now_millis().max(self.created_at);
    }
}
