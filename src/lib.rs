//! Football Studio panel.
//!
//! Library crate exposing the session core, persistence and the dashboard
//! for use by the binary entry point and integration tests.

pub mod config;
pub mod types;
pub mod strategy;
pub mod engine;
pub mod storage;
pub mod dashboard;
