//! Allure result document schema (`<uuid>-result.json`).

use serde::Serialize;

use super::ids::{AllureUuid, HistoryId};
use super::step::StepStatus;
use super::test_case::DerivedStatus;

/// One Allure result document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureResult {
    pub uuid: AllureUuid,
    pub history_id: HistoryId,
    pub test_case_id: String,
    pub full_name: String,
    pub name: String,
    pub description: String,
    pub status: DerivedStatus,
    pub start: i64,
    pub stop: i64,
    pub steps: Vec<AllureStep>,
    pub labels: Vec<AllureLabel>,
    pub links: Vec<AllureLink>,
    pub parameters: Vec<AllureParameter>,
}

impl AllureResult {
    /// Archive entry name for this document.
    pub fn file_name(&self) -> String {
        format!("{}-result.json", self.uuid)
    }
}

/// A step inside an Allure result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureStep {
    pub name: String,
    pub status: StepStatus,
    pub start: i64,
    pub stop: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<AllureStatusDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AllureAttachment>>,
}

/// Failure message or skip trace of a step. Exactly one side is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllureStatusDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// A linked attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllureAttachment {
    pub name: String,
    pub source: String,
}

/// A `{name, value}` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllureLabel {
    pub name: String,
    pub value: String,
}

impl AllureLabel {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        AllureLabel {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Kind of an external link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AllureLinkType {
    Issue,
    Tms,
}

/// An external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllureLink {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: AllureLinkType,
}

/// A test parameter. Always emitted as an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllureParameter {
    pub name: String,
    pub value: String,
}
