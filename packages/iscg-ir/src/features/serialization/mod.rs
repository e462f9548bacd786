// Graph Serializer - IscgGraph → {function_name, nodes, links, nodes_info}
//
// ## Architecture
// - Domain: IscgDocument (+ ordered_map serde helper)
// - Infrastructure: flattening, link deduplication, id consistency checks

pub mod domain;
pub mod infrastructure;

pub use domain::{IscgDocument, Link};
pub use infrastructure::{to_document, to_json, validate_document};
