//! Domain models for Test Case Studio.

pub mod allure;
pub mod backup;
pub mod ids;
pub mod step;
pub mod test_case;

// Re-export commonly used types
pub use allure::{
    AllureAttachment, AllureLabel, AllureLink, AllureLinkType, AllureParameter, AllureResult,
    AllureStatusDetails, AllureStep,
};
pub use backup::{BACKUP_VERSION, Backup, ImportPayload, RecordPayload, StepPayload};
pub use ids::{AllureUuid, HistoryId, RecordId, StepId};
pub use step::{StatusDetail, Step, StepFields, StepStatus};
pub use test_case::{
    DerivedStatus, Priority, Severity, TestCase, TestCaseFields, TestType, now_millis,
};
