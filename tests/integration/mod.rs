//! Integration tests for stockyard
//!
//! These tests drive the public API with real components wired over the
//! in-memory store.

pub mod cache_tests;
pub mod config_tests;
pub mod error_handling_tests;
pub mod monitoring_tests;
pub mod rate_limit_tests;
pub mod session_tests;
