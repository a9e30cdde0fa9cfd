//! Filtered, read-only views over the store.

use crate::models::{DerivedStatus, RecordId, Severity, TestCase};
use crate::services::store::TestCaseStore;

/// Status predicate of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Any,
    Only(DerivedStatus),
}

impl StatusFilter {
    /// Parse a filter value. Empty and "any" mean no restriction.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "any" => Some(Self::Any),
            other => DerivedStatus::parse(other).map(Self::Only),
        }
    }

    fn matches(&self, status: DerivedStatus) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

/// Severity predicate of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityFilter {
    #[default]
    Any,
    Only(Severity),
}

impl SeverityFilter {
    /// Parse a filter value. Empty and "any" mean no restriction.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "any" => Some(Self::Any),
            other => Severity::parse(other).map(Self::Only),
        }
    }

    fn matches(&self, severity: Severity) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => *wanted == severity,
        }
    }
}

/// Search term plus status and severity predicates, all conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseFilter {
    /// Case-insensitive substring of name, description or tags
    pub term: String,
    pub status: StatusFilter,
    pub severity: SeverityFilter,
}

impl TestCaseFilter {
    pub fn matches(&self, record: &TestCase) -> bool {
        self.matches_term(record)
            && self.status.matches(record.derive_status())
            && self.severity.matches(record.severity)
    }

    fn matches_term(&self, record: &TestCase) -> bool {
        if self.term.is_empty() {
            return true;
        }
        let term = self.term.to_lowercase();
        [&record.name, &record.description, &record.tags]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Matching test cases in store order.
    pub fn apply<'a>(&self, store: &'a TestCaseStore) -> Vec<&'a TestCase> {
        store.iter().filter(|r| self.matches(r)).collect()
    }
}

/// A filter together with its last computed result.
///
/// Holds ids only; call [`FilteredView::refresh`] whenever the store or the
/// filter changes.
#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    filter: TestCaseFilter,
    result: Vec<RecordId>,
}

impl FilteredView {
    pub fn new(filter: TestCaseFilter) -> Self {
        FilteredView {
            filter,
            result: Vec::new(),
        }
    }

    pub fn filter(&self) -> &TestCaseFilter {
        &self.filter
    }

    /// Swap the filter inputs and recompute.
    pub fn set_filter(&mut self, filter: TestCaseFilter, store: &TestCaseStore) {
        self.filter = filter;
        self.refresh(store);
    }

    /// Recompute from the current store contents.
    pub fn refresh(&mut self, store: &TestCaseStore) {
        self.result = self
            .filter
            .apply(store)
            .into_iter()
            .map(|r| r.id().clone())
            .collect();
    }

    /// Ids from the last refresh, in store order.
    pub fn ids(&self) -> &[RecordId] {
        &self.result
    }

    /// Resolve the last result against the store, dropping ids deleted since.
    pub fn records<'a>(&self, store: &'a TestCaseStore) -> Vec<&'a TestCase> {
        self.result
            .iter()
            .filter_map(|id| store.find_by_id(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StepFields, StepStatus, TestCaseFields};

    fn sample_store() -> TestCaseStore {
        let mut store = TestCaseStore::new();
        store
            .insert(TestCase::new(TestCaseFields {
                severity: Severity::Normal,
                ..TestCaseFields::named("Login test")
            }))
            .unwrap();

        let mut logout = TestCase::new(TestCaseFields {
            severity: Severity::Critical,
            ..TestCaseFields::named("Logout")
        });
        logout.add_step(StepFields::named("Click logout", StepStatus::Failed));
        store.insert(logout).unwrap();

        let mut search = TestCase::new(TestCaseFields {
            description: "Searches the catalog".to_string(),
            tags: "smoke,Regression".to_string(),
            ..TestCaseFields::named("Search")
        });
        search.add_step(StepFields::named("Type query", StepStatus::Skipped));
        store.insert(search).unwrap();

        store
    }

    fn names(records: &[&TestCase]) -> Vec<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_term_status_severity_are_conjunctive() {
        let store = sample_store();
        let filter = TestCaseFilter {
            term: "log".to_string(),
            status: StatusFilter::Only(DerivedStatus::Failed),
            severity: SeverityFilter::Any,
        };

        assert_eq!(names(&filter.apply(&store)), ["Logout"]);
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() {
        let store = sample_store();
        let result = TestCaseFilter::default().apply(&store);
        assert_eq!(names(&result), ["Login test", "Logout", "Search"]);
    }

    #[test]
    fn test_term_searches_description_and_tags_case_insensitively() {
        let store = sample_store();

        let by_description = TestCaseFilter {
            term: "CATALOG".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&by_description.apply(&store)), ["Search"]);

        let by_tag = TestCaseFilter {
            term: "regression".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&by_tag.apply(&store)), ["Search"]);
    }

    #[test]
    fn test_status_and_severity_filters() {
        let store = sample_store();

        let mixed = TestCaseFilter {
            status: StatusFilter::Only(DerivedStatus::Mixed),
            ..Default::default()
        };
        assert_eq!(names(&mixed.apply(&store)), ["Search"]);

        let critical = TestCaseFilter {
            severity: SeverityFilter::Only(Severity::Critical),
            ..Default::default()
        };
        assert_eq!(names(&critical.apply(&store)), ["Logout"]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!(StatusFilter::parse(""), Some(StatusFilter::Any));
        assert_eq!(
            StatusFilter::parse("failed"),
            Some(StatusFilter::Only(DerivedStatus::Failed))
        );
        assert_eq!(StatusFilter::parse("broken"), None);
        assert_eq!(
            SeverityFilter::parse("TRIVIAL"),
            Some(SeverityFilter::Only(Severity::Trivial))
        );
        assert_eq!(SeverityFilter::parse("any"), Some(SeverityFilter::Any));
    }

    #[test]
    fn test_view_refresh_tracks_store_changes() {
        let mut store = sample_store();
        let mut view = FilteredView::new(TestCaseFilter {
            term: "log".to_string(),
            ..Default::default()
        });
        view.refresh(&store);
        assert_eq!(view.ids().len(), 2);

        let logout_id = store.find_by_name("Logout").unwrap().id().clone();
        store.delete_by_id(&logout_id);
        assert_eq!(names(&view.records(&store)), ["Login test"]);

        view.refresh(&store);
        assert_eq!(view.ids().len(), 1);
    }

    #[test]
    fn test_view_set_filter_recomputes() {
        let store = sample_store();
        let mut view = FilteredView::default();
        view.refresh(&store);
        assert_eq!(view.ids().len(), 3);

        view.set_filter(
            TestCaseFilter {
                severity: SeverityFilter::Only(Severity::Critical),
                ..Default::default()
            },
            &store,
        );
        assert_eq!(names(&view.records(&store)), ["Logout"]);
    }
}
