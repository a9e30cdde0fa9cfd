//! Step model: one action within a test case's procedure.

use serde::{Deserialize, Serialize};

use super::ids::StepId;

/// Recorded outcome of a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Passed,
    Failed,
    Skipped,
}

impl StepStatus {
    /// Convert to wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The status-specific detail that is meaningful for a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusDetail<'a> {
    /// Bug tracker link of a failed step
    BugLink(&'a str),
    /// Reason a step was skipped
    SkipReason(&'a str),
}

/// A step as stored inside a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub name: String,
    pub description: String,
    pub expected_result: String,
    pub status: StepStatus,
    /// Only meaningful when `status` is failed
    pub bug_link: String,
    /// Only meaningful when `status` is skipped
    pub skip_reason: String,
    /// Comma-separated list of URLs
    pub attachments: String,
}

impl Step {
    /// Build a step with a fresh id.
    pub fn new(fields: StepFields) -> Self {
        Self::with_id(StepId::generate(), fields)
    }

    /// Build a step keeping a known id.
    pub fn with_id(id: StepId, fields: StepFields) -> Self {
        Step {
            id,
            name: fields.name,
            description: fields.description,
            expected_result: fields.expected_result,
            status: fields.status,
            bug_link: fields.bug_link,
            skip_reason: fields.skip_reason,
            attachments: fields.attachments,
        }
    }

    /// The detail gated by the current status, if one is populated.
    ///
    /// A bug link on a skipped step (or a skip reason on a failed one) is ignored.
    pub fn status_detail(&self) -> Option<StatusDetail<'_>> {
        match self.status {
            StepStatus::Failed if !self.bug_link.is_empty() => {
                Some(StatusDetail::BugLink(&self.bug_link))
            }
            StepStatus::Skipped if !self.skip_reason.is_empty() => {
                Some(StatusDetail::SkipReason(&self.skip_reason))
            }
            _ => None,
        }
    }

    /// Editable fields of this step.
    pub fn fields(&self) -> StepFields {
        StepFields {
            name: self.name.clone(),
            description: self.description.clone(),
            expected_result: self.expected_result.clone(),
            status: self.status,
            bug_link: self.bug_link.clone(),
            skip_reason: self.skip_reason.clone(),
            attachments: self.attachments.clone(),
        }
    }
}

/// Editable step fields, as submitted by the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepFields {
    pub name: String,
    pub description: String,
    pub expected_result: String,
    pub status: StepStatus,
    pub bug_link: String,
    pub skip_reason: String,
    pub attachments: String,
}

impl StepFields {
    /// Step fields with just a name and status.
    pub fn named(name: impl Into<String>, status: StepStatus) -> Self {
        StepFields {
            name: name.into(),
            status,
            ..Default::default()
        }
    }
}
