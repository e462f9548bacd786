/*
 * ISCG IR - Canonicalization and Instruction Semantic Code Graphs for LLVM IR
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Instruction records, metadata, diagnostics, token helpers
 * - features/    : Vertical slices (symbol_tables → canonicalize → iscg → serialization)
 * - pipeline/    : Per-function processing and the batch runner
 * - config/      : YAML pipeline configuration
 *
 * Performance:
 * - One forward pass per function for symbol collection
 * - Incremental leaf tracking over a petgraph arena
 * - Rayon work-stealing across (unit, function) pairs
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Builder entry points take the full context
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (vertical slices)
pub mod features;

/// Per-function processing and batch orchestration
pub mod pipeline;

/// Pipeline configuration
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Convenience re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use config::PipelineConfig;
pub use errors::{IscgError, Result};
pub use features::canonicalize::{Canonicalized, Canonicalizer};
pub use features::iscg::{EdgeKind, IscgGraph};
pub use features::serialization::IscgDocument;
pub use features::symbol_tables::{FrequencyTables, FunctionSymbols};
pub use pipeline::{process_function, BatchInputs, BatchReport, BatchRunner, FunctionOutput};
pub use shared::models::{
    CanonicalFunction, Diagnostic, DiagnosticKind, Diagnostics, Function, InstructionRecord,
    Metadata,
};
