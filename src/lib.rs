//! Test Case Studio library.
//!
//! In-memory editor core for structured test cases: the record model, the
//! collection store with its filtered views, canonical JSON and Allure export,
//! zip packaging, and import reconciliation.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
