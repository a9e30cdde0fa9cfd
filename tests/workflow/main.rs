//! Workflow test suite.
//!
//! Drives the public API end to end: editing, filtering, export to files on
//! disk and import back from them.
//!
//! Run with: cargo test --test workflow

mod test_helpers;

mod test_allure;
mod test_editing;
mod test_import_export;
