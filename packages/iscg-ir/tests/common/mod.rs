//! Common test utilities for iscg-ir
//!
//! Shared fixtures, assertions, and builders for the integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
