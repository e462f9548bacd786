//! Shared module - Common types and utilities
//!
//! Types that are shared across all features: instruction/function models,
//! external metadata, diagnostics and token scanning helpers.

pub mod models;
pub mod utils;

// Re-exports for convenience
pub use models::*;
