//! Custom assertions for ISCG documents

use iscg_ir::features::serialization::IscgDocument;
use iscg_ir::EdgeKind;

pub fn has_link(doc: &IscgDocument, source: &str, target: &str, kind: EdgeKind) -> bool {
    doc.links
        .iter()
        .any(|(s, t, k)| s == source && t == target && *k == kind)
}

/// Assert that a link exists, printing all links on failure
pub fn assert_link(doc: &IscgDocument, source: &str, target: &str, kind: EdgeKind) {
    assert!(
        has_link(doc, source, target, kind),
        "Expected {source} -> {target} ({kind:?}), links: {:#?}",
        doc.links
    );
}

pub fn assert_no_link(doc: &IscgDocument, source: &str, target: &str, kind: EdgeKind) {
    assert!(
        !has_link(doc, source, target, kind),
        "Unexpected {source} -> {target} ({kind:?})"
    );
}

/// Every link endpoint is a node and node ids are unique
pub fn assert_consistent(doc: &IscgDocument) {
    let mut ids: Vec<&str> = doc.nodes.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), doc.nodes.len(), "duplicate node ids");
    for (s, t, _) in &doc.links {
        assert!(doc.attrs(s).is_some(), "dangling source {s}");
        assert!(doc.attrs(t).is_some(), "dangling target {t}");
    }
}

pub fn instruction_id(node: &str) -> Option<u32> {
    node.parse().ok()
}
