/*
 * ISCG (Instruction Semantic Code Graph)
 *
 * Directed multigraph over one function:
 * - petgraph DiGraph as the node/edge arena
 * - NodeKey → NodeIndex map for O(1) lookup
 * - Out-degree counter per slot for incremental leaf tracking
 *
 * Parallel edges are kept; the serializer deduplicates by
 * (source, target, kind) keeping the first occurrence.
 */

use ahash::AHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::BTreeSet;

use super::edge::EdgeKind;
use super::node::{NodeAttrs, NodeKey};

/// Arena slot
#[derive(Debug, Clone)]
pub struct NodeSlot {
    pub key: NodeKey,
    pub attrs: NodeAttrs,
    out_degree: usize,
}

#[derive(Debug, Clone)]
pub struct IscgGraph {
    pub function_name: String,
    graph: DiGraph<NodeSlot, EdgeKind>,
    node_map: AHashMap<NodeKey, NodeIndex>,
    /// Zero out-degree nodes of the block being walked, in creation order
    leaves: BTreeSet<NodeIndex>,
}

impl IscgGraph {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            graph: DiGraph::new(),
            node_map: AHashMap::new(),
            leaves: BTreeSet::new(),
        }
    }

    /// Add a node, or return the existing one with the same key
    pub fn ensure_node(&mut self, key: NodeKey, attrs: NodeAttrs) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(NodeSlot {
            key: key.clone(),
            attrs,
            out_degree: 0,
        });
        self.node_map.insert(key, idx);
        idx
    }

    #[inline]
    pub fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.node_map.get(key).copied()
    }

    #[inline]
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.node_map.contains_key(key)
    }

    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, kind: EdgeKind) {
        self.graph.add_edge(source, target, kind);
        self.graph[source].out_degree += 1;
        self.leaves.remove(&source);
    }

    // ========================================================================
    // Leaf tracking
    // ========================================================================

    /// Start a new block. Leaves left open by earlier blocks (a `switch`
    /// block, a block without terminator) stay pending.
    pub fn enter_block(&mut self, entry: NodeIndex) {
        self.track_leaf(entry);
    }

    /// Mark a walked node as a leaf candidate
    pub fn track_leaf(&mut self, idx: NodeIndex) {
        if self.graph[idx].out_degree == 0 {
            self.leaves.insert(idx);
        }
    }

    /// Current leaves except `current`, in creation order
    pub fn leaves_except(&self, current: NodeIndex) -> Vec<NodeIndex> {
        self.leaves.iter().copied().filter(|&i| i != current).collect()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Edge count including parallel duplicates
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn slot(&self, idx: NodeIndex) -> &NodeSlot {
        &self.graph[idx]
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph[idx].out_degree
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeSlot> {
        self.graph.node_weights()
    }

    /// Edges in insertion order, duplicates included
    pub fn edges(&self) -> impl Iterator<Item = (&NodeKey, &NodeKey, EdgeKind)> {
        self.graph.edge_references().map(move |e| {
            (
                &self.graph[e.source()].key,
                &self.graph[e.target()].key,
                *e.weight(),
            )
        })
    }

    /// Outgoing edges of `key` as (target, kind)
    pub fn outgoing(&self, key: &NodeKey) -> Vec<(&NodeKey, EdgeKind)> {
        match self.index_of(key) {
            Some(idx) => self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| (&self.graph[e.target()].key, *e.weight()))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn has_edge(&self, source: &NodeKey, target: &NodeKey, kind: EdgeKind) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(s), Some(t)) => self
                .graph
                .edges_connecting(s, t)
                .any(|e| *e.weight() == kind),
            _ => false,
        }
    }
}
