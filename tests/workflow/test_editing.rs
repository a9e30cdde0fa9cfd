//! Editing and filtering through the workspace.

use test_case_studio_lib::error::AppError;
use test_case_studio_lib::models::{DerivedStatus, Severity, StepFields, StepStatus, TestCaseFields};
use test_case_studio_lib::services::{
    FilteredView, SeverityFilter, StatusFilter, TestCaseFilter, Workspace,
};

use super::test_helpers::*;

#[test]
fn test_derived_status_follows_steps() {
    let (workspace, login, logout) = seeded_workspace();

    let login = workspace.store().find_by_id(&login).unwrap();
    let logout = workspace.store().find_by_id(&logout).unwrap();

    assert_eq!(login.derive_status(), DerivedStatus::Failed);
    assert_eq!(logout.derive_status(), DerivedStatus::Passed);
}

#[test]
fn test_update_changes_derived_status() {
    let (mut workspace, login, _) = seeded_workspace();

    workspace
        .update(
            &login,
            login_fields(),
            vec![
                StepFields::named("Open login page", StepStatus::Passed),
                StepFields::named("Confirm 2FA", StepStatus::Skipped),
            ],
        )
        .unwrap();

    let record = workspace.store().find_by_id(&login).unwrap();
    assert_eq!(record.derive_status(), DerivedStatus::Mixed);
    assert_eq!(record.id(), &login);
}

#[test]
fn test_clone_leaves_source_untouched() {
    let (mut workspace, login, _) = seeded_workspace();
    let before = workspace.store().find_by_id(&login).unwrap().clone();

    let name = workspace.suggested_clone_name(&login).unwrap();
    let copy_id = workspace.clone_test_case(&login, &name).unwrap().unwrap();

    let source = workspace.store().find_by_id(&login).unwrap();
    let copy = workspace.store().find_by_id(&copy_id).unwrap();

    assert_eq!(source, &before);
    assert_eq!(copy.name, "Login test (Copy)");
    assert_ne!(copy.id(), source.id());
    assert_eq!(copy.steps().len(), source.steps().len());
    for (a, b) in copy.steps().iter().zip(source.steps()) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.fields(), b.fields());
    }
}

#[test]
fn test_empty_names_are_rejected() {
    let (mut workspace, login, _) = seeded_workspace();

    assert!(matches!(
        workspace.create(TestCaseFields::named(""), Vec::new()),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        workspace.clone_test_case(&login, ""),
        Err(AppError::Validation(_))
    ));
    assert_eq!(workspace.store().len(), 2);
}

#[test]
fn test_filter_scenario() {
    let mut workspace = Workspace::default();
    workspace
        .create(TestCaseFields::named("Login test"), Vec::new())
        .unwrap();
    workspace
        .create(
            TestCaseFields {
                severity: Severity::Critical,
                ..TestCaseFields::named("Logout")
            },
            vec![StepFields::named("Click logout", StepStatus::Failed)],
        )
        .unwrap();

    let filter = TestCaseFilter {
        term: "log".to_string(),
        status: StatusFilter::Only(DerivedStatus::Failed),
        severity: SeverityFilter::Any,
    };
    let names: Vec<&str> = workspace
        .filtered(&filter)
        .iter()
        .map(|r| r.name.as_str())
        .collect();

    assert_eq!(names, ["Logout"]);
}

#[test]
fn test_view_follows_deletes_after_refresh() {
    let (mut workspace, login, _) = seeded_workspace();
    let mut view = FilteredView::new(TestCaseFilter {
        term: "LOG".to_string(),
        ..Default::default()
    });
    view.refresh(workspace.store());
    assert_eq!(view.ids().len(), 2);

    workspace.delete(&login);
    view.refresh(workspace.store());

    let names: Vec<&str> = view
        .records(workspace.store())
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["Logout"]);
}

#[test]
fn test_delete_unknown_id_changes_nothing() {
    let (mut workspace, _, _) = seeded_workspace();
    let before = workspace.store().as_slice().to_vec();

    assert!(!workspace.delete(&"no-such-id".into()));
    assert_eq!(workspace.store().as_slice(), before.as_slice());
}
