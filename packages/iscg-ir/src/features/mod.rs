//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure data model
//! - application/ - Use cases (where the feature exposes one)
//! - infrastructure/ - Algorithms over the domain types
//!
//! Flow: symbol_tables → canonicalize → iscg → serialization

pub mod canonicalize;
pub mod iscg;
pub mod serialization;
pub mod symbol_tables;
