//! Shared helpers for workflow tests.

use std::path::{Path, PathBuf};

use test_case_studio_lib::models::{
    RecordId, Severity, StepFields, StepStatus, TestCaseFields,
};
use test_case_studio_lib::services::Workspace;

/// A failed login case with three steps covering every status.
pub fn login_fields() -> TestCaseFields {
    TestCaseFields {
        description: "User signs in with valid credentials".to_string(),
        epic: "Auth".to_string(),
        feature: "Sign in".to_string(),
        severity: Severity::Critical,
        owner: "qa-team".to_string(),
        tags: "smoke,regression".to_string(),
        issue_links: "https://issues.example.com/AUTH-1".to_string(),
        test_case_links: "https://tms.example.com/TC-7".to_string(),
        ..TestCaseFields::named("Login test")
    }
}

pub fn login_steps() -> Vec<StepFields> {
    vec![
        StepFields {
            attachments: "https://cdn.example.com/shots/open.png".to_string(),
            ..StepFields::named("Open login page", StepStatus::Passed)
        },
        StepFields {
            bug_link: "https://issues.example.com/AUTH-2".to_string(),
            ..StepFields::named("Submit credentials", StepStatus::Failed)
        },
        StepFields {
            skip_reason: "No second factor configured".to_string(),
            ..StepFields::named("Confirm 2FA", StepStatus::Skipped)
        },
    ]
}

/// Workspace holding the login case plus a step-less logout case.
pub fn seeded_workspace() -> (Workspace, RecordId, RecordId) {
    let mut workspace = Workspace::default();
    let login = workspace
        .create(login_fields(), login_steps())
        .expect("create login");
    let logout = workspace
        .create(
            TestCaseFields {
                severity: Severity::Minor,
                ..TestCaseFields::named("Logout")
            },
            Vec::new(),
        )
        .expect("create logout");
    (workspace, login, logout)
}

/// Write bytes to `dir/name` and return the path.
pub async fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, bytes).await.expect("write file");
    path
}
