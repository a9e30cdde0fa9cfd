//! Export transformer: canonical JSON, backups and Allure result documents.

use rand::Rng;

use crate::config::ExportSettings;
use crate::error::AppResult;
use crate::models::{
    AllureAttachment, AllureLabel, AllureLink, AllureLinkType, AllureResult, AllureStatusDetails,
    AllureStep, AllureUuid, BACKUP_VERSION, Backup, HistoryId, StatusDetail, Step, TestCase,
};
use crate::models::ids::generate_uuid;
use crate::services::store::TestCaseStore;

// ============================================================================
// Canonical JSON
// ============================================================================

/// Pretty-printed canonical document of one test case.
pub fn canonical_json(record: &TestCase) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Archive entry name of a test case inside a full export.
pub fn archive_file_name(record: &TestCase) -> String {
    format!("testcase-{}.json", record.id())
}

/// Download name of a single exported test case.
///
/// Every character outside `[A-Za-z0-9]` in the name becomes `_`.
pub fn single_export_file_name(record: &TestCase, timestamp: i64) -> String {
    let sanitized: String = record
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("testcase-{}-{}.json", sanitized, timestamp)
}

// ============================================================================
// Backup
// ============================================================================

/// Snapshot of the whole store as a backup document.
pub fn backup(store: &TestCaseStore, timestamp: i64) -> Backup<'_> {
    Backup {
        timestamp,
        version: BACKUP_VERSION,
        test_cases: store.iter().collect(),
    }
}

/// Pretty-printed backup document.
pub fn backup_json(store: &TestCaseStore, timestamp: i64) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(&backup(store, timestamp))?)
}

pub fn backup_file_name(timestamp: i64) -> String {
    format!("backup-{}.json", timestamp)
}

// ============================================================================
// Allure
// ============================================================================

/// Record fields mapped to Allure label names, in emission order.
///
/// Severity and priority are emitted lowercased.
const LABEL_FIELDS: &[(LabelSource, &str)] = &[
    (LabelSource::Epic, "epic"),
    (LabelSource::Feature, "feature"),
    (LabelSource::Story, "story"),
    (LabelSource::Severity, "severity"),
    (LabelSource::Priority, "priority"),
    (LabelSource::Owner, "owner"),
    (LabelSource::Author, "author"),
    (LabelSource::TestLayer, "layer"),
    (LabelSource::Component, "component"),
    (LabelSource::Environment, "environment"),
];

#[derive(Debug, Clone, Copy)]
enum LabelSource {
    Epic,
    Feature,
    Story,
    Severity,
    Priority,
    Owner,
    Author,
    TestLayer,
    Component,
    Environment,
}

impl LabelSource {
    fn value(self, record: &TestCase) -> String {
        match self {
            Self::Epic => record.epic.clone(),
            Self::Feature => record.feature.clone(),
            Self::Story => record.story.clone(),
            Self::Severity => record.severity.as_str().to_lowercase(),
            Self::Priority => record.priority.as_str().to_lowercase(),
            Self::Owner => record.owner.clone(),
            Self::Author => record.author.clone(),
            Self::TestLayer => record.test_layer.clone(),
            Self::Component => record.component.clone(),
            Self::Environment => record.environment.clone(),
        }
    }
}

/// Builds Allure result documents from test cases.
#[derive(Debug, Clone, Default)]
pub struct AllureTransformer {
    settings: ExportSettings,
}

impl AllureTransformer {
    pub fn new(settings: ExportSettings) -> Self {
        AllureTransformer { settings }
    }

    /// Transform one test case, starting the synthesized run at `start`.
    pub fn transform(&self, record: &TestCase, start: i64) -> AllureResult {
        let mut rng = rand::thread_rng();

        let test_case_id = if record.test_case_id.is_empty() {
            generate_uuid()
        } else {
            record.test_case_id.clone()
        };

        let steps = record
            .steps()
            .iter()
            .map(|step| {
                let stop = start + rng.gen_range(0..=self.settings.max_step_duration_ms.max(0));
                allure_step(step, start, stop)
            })
            .collect();

        AllureResult {
            uuid: AllureUuid::generate(),
            history_id: HistoryId::generate(),
            test_case_id,
            full_name: self.full_name(&record.name),
            name: record.name.clone(),
            description: record.description.clone(),
            status: record.derive_status(),
            start,
            stop: start + rng.gen_range(0..=self.settings.max_test_duration_ms.max(0)),
            steps,
            labels: labels(record),
            links: links(record),
            parameters: Vec::new(),
        }
    }

    /// `<namespace>.<name without whitespace>`
    pub fn full_name(&self, name: &str) -> String {
        let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        format!("{}.{}", self.settings.allure_namespace, compact)
    }
}

fn allure_step(step: &Step, start: i64, stop: i64) -> AllureStep {
    let status_details = step.status_detail().map(|detail| match detail {
        StatusDetail::BugLink(link) => AllureStatusDetails {
            message: Some(format!("Bug link: {}", link)),
            trace: None,
        },
        StatusDetail::SkipReason(reason) => AllureStatusDetails {
            message: None,
            trace: Some(format!("Skip reason: {}", reason)),
        },
    });

    let attachments = (!step.attachments.is_empty()).then(|| {
        split_list(&step.attachments)
            .map(|source| AllureAttachment {
                name: source.rsplit('/').next().unwrap_or(source).to_string(),
                source: source.to_string(),
            })
            .collect()
    });

    AllureStep {
        name: step.name.clone(),
        status: step.status,
        start,
        stop,
        status_details,
        attachments,
    }
}

/// Fixed-order field labels followed by one `tag` label per tag.
fn labels(record: &TestCase) -> Vec<AllureLabel> {
    let mut labels: Vec<AllureLabel> = LABEL_FIELDS
        .iter()
        .filter_map(|(source, name)| {
            let value = source.value(record);
            (!value.is_empty()).then(|| AllureLabel::new(*name, value))
        })
        .collect();

    if !record.tags.is_empty() {
        labels.extend(split_list(&record.tags).map(|tag| AllureLabel::new("tag", tag)));
    }

    labels
}

/// Issue links first, then test management links.
fn links(record: &TestCase) -> Vec<AllureLink> {
    let mut links = Vec::new();

    if !record.issue_links.is_empty() {
        links.extend(split_list(&record.issue_links).map(|url| AllureLink {
            name: "Issue".to_string(),
            url: url.to_string(),
            link_type: AllureLinkType::Issue,
        }));
    }

    if !record.test_case_links.is_empty() {
        links.extend(split_list(&record.test_case_links).map(|url| AllureLink {
            name: "Test Case".to_string(),
            url: url.to_string(),
            link_type: AllureLinkType::Tms,
        }));
    }

    links
}

/// Comma-separated entries, each trimmed, order preserved.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim)
}
