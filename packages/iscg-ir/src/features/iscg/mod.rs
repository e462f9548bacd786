// ISCG - Instruction Semantic Code Graph
//
// Turns a canonical function into a typed directed multigraph:
// control flow (Entry/Sequential/Control), data flow (Data/Condition),
// parameter flow and global-variable flow.
//
// ## Architecture
// - Domain: NodeKey/NodeAttrs, EdgeKind, IscgGraph (petgraph arena)
// - Infrastructure: OperandResolver, IscgBuilder (leaf-tracking walk)
// - Application: IscgUseCase

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export application layer
pub use application::{IscgBuild, IscgUseCase, IscgUseCaseImpl};

// Re-exports
pub use domain::{EdgeKind, IscgGraph, NodeAttrs, NodeKey};

// Re-export infrastructure (internal use - prefer application layer)
#[doc(hidden)]
pub use infrastructure::IscgBuilder;
