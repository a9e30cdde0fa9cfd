//! Business logic services.

pub mod archive;
pub mod export;
pub mod filter;
pub mod import;
pub mod progress;
pub mod store;
pub mod workspace;

pub use archive::Archive;
pub use filter::{FilteredView, SeverityFilter, StatusFilter, TestCaseFilter};
pub use import::ImportSummary;
pub use progress::{Operation, ProgressBroadcaster, ProgressEvent};
pub use store::TestCaseStore;
pub use workspace::{ExportedFile, Workspace, collect_steps};
