// ISCG Domain Models
//
// Node identity/attributes, edge kinds and the per-function graph arena.

mod edge;
mod graph;
mod node;

pub use edge::EdgeKind;
pub use graph::{IscgGraph, NodeSlot};
pub use node::{NodeAttrs, NodeKey, FUNCTION_ENTRY_ID};
