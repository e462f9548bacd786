//! Graph → IscgDocument flattening

use ahash::AHashSet;
use tracing::debug;

use crate::errors::{IscgError, Result};
use crate::features::iscg::domain::{EdgeKind, IscgGraph};
use crate::features::serialization::domain::{IscgDocument, Link};

/// Flatten a graph, deduplicating links and checking id consistency
pub fn to_document(graph: &IscgGraph) -> Result<IscgDocument> {
    let mut nodes = Vec::with_capacity(graph.node_count());
    let mut nodes_info = Vec::with_capacity(graph.node_count());
    let mut ids: AHashSet<String> = AHashSet::with_capacity(graph.node_count());

    for slot in graph.nodes() {
        let id = slot.key.id();
        if !ids.insert(id.clone()) {
            return Err(IscgError::invariant(
                &graph.function_name,
                format!("duplicate node id `{}`", id),
            ));
        }
        nodes.push(id.clone());
        nodes_info.push((id, slot.attrs.clone()));
    }

    let mut seen: AHashSet<(String, String, EdgeKind)> = AHashSet::new();
    let mut links: Vec<Link> = Vec::with_capacity(graph.edge_count());
    for (source, target, kind) in graph.edges() {
        let link = (source.id(), target.id(), kind);
        for endpoint in [&link.0, &link.1] {
            if !ids.contains(endpoint) {
                return Err(IscgError::invariant(
                    &graph.function_name,
                    format!("link endpoint `{}` missing from nodes_info", endpoint),
                ));
            }
        }
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    debug!(
        function = %graph.function_name,
        nodes = nodes.len(),
        links = links.len(),
        dropped = graph.edge_count() - links.len(),
        "graph serialized"
    );

    Ok(IscgDocument {
        function_name: graph.function_name.clone(),
        nodes,
        links,
        nodes_info,
    })
}

/// Re-check a document built elsewhere (e.g. read back from disk)
pub fn validate_document(doc: &IscgDocument) -> Result<()> {
    let mut ids = AHashSet::with_capacity(doc.nodes.len());
    for id in &doc.nodes {
        if !ids.insert(id.as_str()) {
            return Err(IscgError::invariant(
                &doc.function_name,
                format!("duplicate node id `{}`", id),
            ));
        }
    }
    let info_ids: AHashSet<&str> = doc.nodes_info.iter().map(|(id, _)| id.as_str()).collect();
    for (source, target, _) in &doc.links {
        for endpoint in [source, target] {
            if !info_ids.contains(endpoint.as_str()) {
                return Err(IscgError::invariant(
                    &doc.function_name,
                    format!("link endpoint `{}` missing from nodes_info", endpoint),
                ));
            }
        }
    }
    Ok(())
}

pub fn to_json(doc: &IscgDocument, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::iscg::domain::{NodeAttrs, NodeKey};
    use pretty_assertions::assert_eq;

    fn small_graph() -> IscgGraph {
        let mut g = IscgGraph::new("f");
        let entry = g.ensure_node(
            NodeKey::FunctionEntry,
            NodeAttrs::Function {
                num_params: 0,
                bb_num: 1,
            },
        );
        let block = g.ensure_node(
            NodeKey::Block("%label_0".into()),
            NodeAttrs::Block { block_inst_count: 1 },
        );
        let ret = g.ensure_node(
            NodeKey::Instruction(0),
            NodeAttrs::Instruction {
                instruction: "ret void".into(),
                opcode: "ret".into(),
                uses_param: false,
            },
        );
        g.add_edge(entry, block, EdgeKind::Entry);
        g.add_edge(block, ret, EdgeKind::Sequential);
        g.add_edge(block, ret, EdgeKind::Sequential);
        g
    }

    #[test]
    fn test_links_are_deduplicated() {
        let doc = to_document(&small_graph()).unwrap();
        assert_eq!(doc.nodes, vec!["function_start", "%label_0", "0"]);
        assert_eq!(
            doc.links,
            vec![
                ("function_start".to_string(), "%label_0".to_string(), EdgeKind::Entry),
                ("%label_0".to_string(), "0".to_string(), EdgeKind::Sequential),
            ]
        );
    }

    #[test]
    fn test_json_shape_preserves_order() {
        let doc = to_document(&small_graph()).unwrap();
        let json = to_json(&doc, false).unwrap();
        assert!(json.starts_with(r#"{"function_name":"f","nodes":["function_start","%label_0","0"]"#));
        assert!(json.contains(r#"["function_start","%label_0","Entry"]"#));

        let start = json.find(r#""function_start":{"type":"function""#).unwrap();
        let ret = json.find(r#""0":{"type":"instruction""#).unwrap();
        assert!(start < ret);

        let back: IscgDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut g = IscgGraph::new("clash");
        // a parameter and a block that render to the same id
        g.ensure_node(
            NodeKey::Block("%x".into()),
            NodeAttrs::Block { block_inst_count: 0 },
        );
        g.ensure_node(
            NodeKey::Parameter("%x".into()),
            NodeAttrs::Parameter {
                define: "i32 %x".into(),
            },
        );
        let err = to_document(&g).unwrap_err();
        assert!(matches!(err, IscgError::SerializationInvariantViolation { .. }));
    }

    #[test]
    fn test_validate_document_dangling_link() {
        let mut doc = to_document(&small_graph()).unwrap();
        doc.links.push(("7".into(), "0".into(), EdgeKind::Data));
        assert!(validate_document(&doc).is_err());
        doc.links.pop();
        assert!(validate_document(&doc).is_ok());
    }
}
